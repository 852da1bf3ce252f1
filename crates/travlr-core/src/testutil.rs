//! Test utilities: in-memory implementations of the core store traits.
//!
//! All fakes use `Arc<Mutex<_>>` so clones share state and tests can assert
//! on what was written.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::audit::{AuditSink, NewAuditEntry};
use crate::error::AppError;
use crate::meal::{Meal, MealType};
use crate::news::{News, NewsCategory};
use crate::pagination::{Window, select_window};
use crate::resource::{Filter, Resource, ResourceStore};
use crate::room::{Room, RoomType};
use crate::trip::Trip;
use crate::user::{NewUser, User, UserStore};

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Vec-backed [`ResourceStore`] for any resource.
#[derive(Clone)]
pub struct MemoryStore<R> {
    items: Arc<Mutex<Vec<R>>>,
}

impl<R: Resource> MemoryStore<R> {
    pub fn empty() -> Self {
        Self::with_items(Vec::new())
    }

    pub fn with_items(items: Vec<R>) -> Self {
        Self {
            items: Arc::new(Mutex::new(items)),
        }
    }

    pub fn snapshot(&self) -> Vec<R> {
        self.items.lock().unwrap().clone()
    }
}

impl<R: Resource> ResourceStore<R> for MemoryStore<R> {
    async fn fetch_window(&self, filter: &R::Filter, window: &Window) -> Result<Vec<R>, AppError> {
        let items = self.items.lock().unwrap();
        let matching = items.iter().filter(|item| filter.matches(item)).cloned();
        Ok(select_window(matching, window, |item: &R| {
            item.cursor(window.sort.field)
        }))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<R>, AppError> {
        let items = self.items.lock().unwrap();
        Ok(items.iter().find(|item| item.code() == code).cloned())
    }

    async fn insert(&self, draft: &R::Draft) -> Result<R, AppError> {
        let created = R::build(Uuid::new_v4(), draft, Utc::now());
        let mut items = self.items.lock().unwrap();
        if items.iter().any(|item| item.code() == created.code()) {
            return Err(AppError::Conflict {
                field: "code".into(),
            });
        }
        items.push(created.clone());
        Ok(created)
    }

    async fn update(&self, code: &str, draft: &R::Draft) -> Result<Option<R>, AppError> {
        let mut items = self.items.lock().unwrap();
        Ok(items.iter_mut().find(|item| item.code() == code).map(|item| {
            item.overwrite(draft, Utc::now());
            item.clone()
        }))
    }

    async fn delete(&self, code: &str) -> Result<Option<R>, AppError> {
        let mut items = self.items.lock().unwrap();
        Ok(items
            .iter()
            .position(|item| item.code() == code)
            .map(|idx| items.remove(idx)))
    }
}

// ---------------------------------------------------------------------------
// MemoryUserStore
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<Mutex<Vec<User>>>,
}

impl MemoryUserStore {
    pub fn snapshot(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.users.lock().unwrap().clear();
    }
}

impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, new: &NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new.email) {
            return Err(AppError::Conflict {
                field: "email".into(),
            });
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email.clone(),
            name: new.name.clone(),
            role: new.role,
            password_hash: new.password_hash.clone(),
            schema_version: 1,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }
}

// ---------------------------------------------------------------------------
// MemoryAudit
// ---------------------------------------------------------------------------

/// Records audit entries, or fails every write when built with `failing()`.
#[derive(Clone, Default)]
pub struct MemoryAudit {
    entries: Arc<Mutex<Vec<NewAuditEntry>>>,
    fail: bool,
}

impl MemoryAudit {
    pub fn failing() -> Self {
        Self {
            entries: Arc::default(),
            fail: true,
        }
    }

    pub fn entries(&self) -> Vec<NewAuditEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl AuditSink for MemoryAudit {
    async fn record(&self, entry: &NewAuditEntry) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::DatabaseError("audit_log unavailable".into()));
        }
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sample data
// ---------------------------------------------------------------------------

/// A valid trip with code `TRIP{n:03}`, created at `created_at`.
pub fn sample_trip(n: usize, created_at: DateTime<Utc>) -> Trip {
    Trip {
        id: Uuid::new_v4(),
        code: format!("TRIP{n:03}"),
        name: format!("Sample Trip {n}"),
        length: 4,
        start: created_at + Duration::days(30),
        resort: "Emerald Bay, 3 stars".into(),
        per_person: 799.0,
        image: "reef1.jpg".into(),
        description: "Sed et augue lorem. In sit amet placerat arcu.".into(),
        schema_version: 1,
        created_at,
        updated_at: created_at,
    }
}

pub fn sample_room(n: usize, created_at: DateTime<Utc>) -> Room {
    Room {
        id: Uuid::new_v4(),
        code: format!("ROOM{n:03}"),
        name: format!("Sample Room {n}"),
        room_type: RoomType::Double,
        beds: 1,
        max_occupancy: 2,
        price_per_night: 199.0,
        image: "room.jpg".into(),
        description: "A comfortable room.".into(),
        amenities: vec!["WiFi".into()],
        available: true,
        trip_id: None,
        schema_version: 1,
        created_at,
        updated_at: created_at,
    }
}

pub fn sample_meal(n: usize, created_at: DateTime<Utc>) -> Meal {
    Meal {
        id: Uuid::new_v4(),
        code: format!("MEAL{n:03}"),
        name: format!("Sample Meal {n}"),
        cuisine: "Mediterranean".into(),
        meal_type: MealType::Lunch,
        price: 45.0,
        image: "meal.jpg".into(),
        description: "Fresh and local.".into(),
        ingredients: vec!["Olive Oil".into()],
        allergens: Vec::new(),
        vegetarian: false,
        vegan: false,
        gluten_free: false,
        available: true,
        trip_id: None,
        schema_version: 1,
        created_at,
        updated_at: created_at,
    }
}

/// A published article whose publish date equals `created_at`.
pub fn sample_news(n: usize, created_at: DateTime<Utc>) -> News {
    News {
        id: Uuid::new_v4(),
        code: format!("NEWS{n:03}"),
        title: format!("Sample Article {n}"),
        category: NewsCategory::General,
        author_id: Uuid::new_v4(),
        author_name: Some("Admin User".into()),
        publish_date: created_at,
        image: "news.jpg".into(),
        summary: "A short summary.".into(),
        content: "The full article body.".into(),
        tags: Vec::new(),
        featured: false,
        published: true,
        trip_id: None,
        schema_version: 1,
        created_at,
        updated_at: created_at,
    }
}
