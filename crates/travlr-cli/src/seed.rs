//! Seed file loading and insertion.
//!
//! A seed file is one JSON document with `users`, `trips`, `rooms`, `meals`
//! and `news` arrays. Every entry is checked before anything is written, and
//! seeding wipes existing data first.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use uuid::Uuid;

use travlr_core::meal::MealDraft;
use travlr_core::news::NewsDraft;
use travlr_core::room::RoomDraft;
use travlr_core::trip::TripDraft;
use travlr_core::user::{NewUser, Registration};
use travlr_core::validation::{Mode, Validate};
use travlr_core::{ResourceStore, Role, User, UserStore, password};
use travlr_db::Database;

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub users: Vec<Registration>,
    #[serde(default)]
    pub trips: Vec<TripDraft>,
    #[serde(default)]
    pub rooms: Vec<RoomDraft>,
    #[serde(default)]
    pub meals: Vec<MealDraft>,
    #[serde(default)]
    pub news: Vec<SeedArticle>,
}

/// A news draft plus the byline to print on it. Articles are owned by the
/// first admin account in the same file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedArticle {
    pub author_name: Option<String>,
    #[serde(flatten)]
    pub draft: NewsDraft,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub trips: usize,
    pub rooms: usize,
    pub meals: usize,
    pub news: usize,
}

impl SeedFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid seed file: {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Normalize and validate every entry.
    ///
    /// Seed data may be historical, so trips are checked with the update
    /// rules, which allow a start date in the past.
    pub fn prepare(&mut self) -> Result<()> {
        for (i, user) in self.users.iter_mut().enumerate() {
            check("user", i, user, Mode::Create)?;
        }
        for (i, trip) in self.trips.iter_mut().enumerate() {
            check("trip", i, trip, Mode::Update)?;
        }
        for (i, room) in self.rooms.iter_mut().enumerate() {
            check("room", i, room, Mode::Update)?;
        }
        for (i, meal) in self.meals.iter_mut().enumerate() {
            check("meal", i, meal, Mode::Update)?;
        }

        if !self.news.is_empty() && self.author().is_none() {
            bail!("Seed file has news articles but no admin user to author them");
        }
        for (i, article) in self.news.iter_mut().enumerate() {
            article.draft.normalize();
            // The real author id is only known after the users are inserted.
            let probe = article.draft.clone().with_author(Uuid::max(), "");
            probe
                .validate(Mode::Update)
                .map_err(|e| anyhow!("news #{}: {e}", i + 1))?;
        }
        Ok(())
    }

    /// Email of the account that will own the seeded articles.
    fn author(&self) -> Option<&str> {
        self.users
            .iter()
            .find(|u| u.role == Some(Role::Admin))
            .map(|u| u.email.as_str())
    }

    /// Clear the database and insert everything. Call [`SeedFile::prepare`]
    /// first.
    pub async fn apply(self, db: &Database) -> Result<SeedSummary> {
        db.clear_all().await.context("Failed to clear existing data")?;
        tracing::info!("Cleared existing data");

        let author_email = self.author().map(str::to_string);
        let mut summary = SeedSummary::default();
        let mut author: Option<User> = None;

        let users = db.users();
        for registration in self.users {
            let user = insert_user(&users, registration).await?;
            if author_email.as_deref() == Some(user.email.as_str()) {
                author = Some(user);
            }
            summary.users += 1;
        }

        let trips = db.trips();
        for draft in &self.trips {
            trips.insert(draft).await?;
            summary.trips += 1;
        }

        let rooms = db.rooms();
        for draft in &self.rooms {
            rooms.insert(draft).await?;
            summary.rooms += 1;
        }

        let meals = db.meals();
        for draft in &self.meals {
            meals.insert(draft).await?;
            summary.meals += 1;
        }

        if let Some(author) = author {
            let news = db.news();
            for article in self.news {
                let byline = article.author_name.unwrap_or_else(|| author.name.clone());
                let draft = article.draft.with_author(author.id, byline);
                news.insert(&draft).await?;
                summary.news += 1;
            }
        }

        Ok(summary)
    }
}

/// Hash the password and insert a validated registration.
pub async fn insert_user<U: UserStore>(users: &U, registration: Registration) -> Result<User> {
    let password_hash = password::hash_async(registration.password).await?;
    let user = users
        .insert(&NewUser {
            email: registration.email,
            name: registration.name,
            role: registration.role.unwrap_or_default(),
            password_hash,
        })
        .await?;
    tracing::info!(email = %user.email, role = %user.role, "Created user");
    Ok(user)
}

fn check<T: Validate>(kind: &str, index: usize, item: &mut T, mode: Mode) -> Result<()> {
    item.normalize();
    item.validate(mode)
        .map_err(|e| anyhow!("{kind} #{}: {e}", index + 1))
}
