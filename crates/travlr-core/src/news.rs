use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pagination::{Cursor, CursorField, Sort};
use crate::resource::{Filter, Resource, text_matches};
use crate::validation::{Mode, Validate, ValidationErrors, Validator, normalize_code};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NewsCategory {
    #[serde(rename = "Travel Tips")]
    TravelTips,
    #[serde(rename = "Destination Guide")]
    DestinationGuide,
    #[serde(rename = "Company News")]
    CompanyNews,
    #[serde(rename = "Special Offers")]
    SpecialOffers,
    Events,
    General,
}

impl NewsCategory {
    pub const ALL: [NewsCategory; 6] = [
        NewsCategory::TravelTips,
        NewsCategory::DestinationGuide,
        NewsCategory::CompanyNews,
        NewsCategory::SpecialOffers,
        NewsCategory::Events,
        NewsCategory::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NewsCategory::TravelTips => "Travel Tips",
            NewsCategory::DestinationGuide => "Destination Guide",
            NewsCategory::CompanyNews => "Company News",
            NewsCategory::SpecialOffers => "Special Offers",
            NewsCategory::Events => "Events",
            NewsCategory::General => "General",
        }
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewsCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NewsCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown news category: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct News {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub category: NewsCategory,
    pub author_id: Uuid,
    /// Author's name at the time of writing.
    pub author_name: Option<String>,
    pub publish_date: DateTime<Utc>,
    pub image: String,
    pub summary: String,
    pub content: String,
    pub tags: Vec<String>,
    pub featured: bool,
    pub published: bool,
    pub trip_id: Option<Uuid>,
    pub schema_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

/// The author is taken from the authenticated caller, never the body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsDraft {
    pub code: String,
    pub title: String,
    pub category: NewsCategory,
    #[serde(skip)]
    pub author_id: Uuid,
    #[serde(skip)]
    pub author_name: Option<String>,
    #[serde(default = "Utc::now")]
    pub publish_date: DateTime<Utc>,
    pub image: String,
    pub summary: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_true")]
    pub published: bool,
    #[serde(default)]
    pub trip_id: Option<Uuid>,
}

impl NewsDraft {
    pub fn with_author(mut self, author_id: Uuid, author_name: impl Into<String>) -> Self {
        self.author_id = author_id;
        self.author_name = Some(author_name.into());
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPatch {
    pub title: Option<String>,
    pub category: Option<NewsCategory>,
    pub publish_date: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
    pub trip_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct NewsFilter {
    /// Full-text query over title, summary, content and tags.
    pub search: Option<String>,
    pub category: Option<NewsCategory>,
    pub featured: Option<bool>,
    /// `None` lists both published and unpublished articles.
    pub published: Option<bool>,
}

impl Filter<News> for NewsFilter {
    fn matches(&self, news: &News) -> bool {
        if self.category.is_some_and(|c| c != news.category) {
            return false;
        }
        if self.featured.is_some_and(|f| f != news.featured) {
            return false;
        }
        if self.published.is_some_and(|p| p != news.published) {
            return false;
        }
        self.search.as_deref().is_none_or(|q| {
            let tags = news.tags.join(" ");
            text_matches(q, &[&news.title, &news.summary, &news.content, &tags])
        })
    }
}

impl Validate for NewsDraft {
    fn normalize(&mut self) {
        self.code = normalize_code(&self.code);
        self.title = self.title.trim().to_string();
        self.image = self.image.trim().to_string();
        self.tags = self
            .tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
    }

    fn validate(&self, _mode: Mode) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.code("code", &self.code)
            .required("title", &self.title, "News title is required")
            .length("title", &self.title, 5, 200)
            .check(!self.author_id.is_nil(), "author", "Author is required")
            .required("image", &self.image, "News image is required")
            .required("summary", &self.summary, "News summary is required")
            .length("summary", &self.summary, 1, 500)
            .required("content", &self.content, "News content is required");
        if !self.summary.is_empty() {
            v.check(
                self.summary != self.content,
                "summary",
                "Summary should be a brief excerpt, not the full content",
            );
        }
        v.finish()
    }
}

impl Resource for News {
    type Draft = NewsDraft;
    type Patch = NewsPatch;
    type Filter = NewsFilter;

    const NAME: &'static str = "News article";
    const COLLECTION: &'static str = "news";
    const SORT: Sort = Sort::desc(CursorField::PublishDate);

    fn id(&self) -> Uuid {
        self.id
    }

    fn code(&self) -> &str {
        &self.code
    }

    fn cursor(&self, field: CursorField) -> Cursor {
        match field {
            CursorField::PublishDate => Cursor::new(self.publish_date),
            CursorField::CreatedAt => Cursor::new(self.created_at),
        }
    }

    fn to_draft(&self) -> NewsDraft {
        NewsDraft {
            code: self.code.clone(),
            title: self.title.clone(),
            category: self.category,
            author_id: self.author_id,
            author_name: self.author_name.clone(),
            publish_date: self.publish_date,
            image: self.image.clone(),
            summary: self.summary.clone(),
            content: self.content.clone(),
            tags: self.tags.clone(),
            featured: self.featured,
            published: self.published,
            trip_id: self.trip_id,
        }
    }

    fn merge(draft: &mut NewsDraft, patch: NewsPatch) {
        if let Some(title) = patch.title {
            draft.title = title;
        }
        if let Some(category) = patch.category {
            draft.category = category;
        }
        if let Some(publish_date) = patch.publish_date {
            draft.publish_date = publish_date;
        }
        if let Some(image) = patch.image {
            draft.image = image;
        }
        if let Some(summary) = patch.summary {
            draft.summary = summary;
        }
        if let Some(content) = patch.content {
            draft.content = content;
        }
        if let Some(tags) = patch.tags {
            draft.tags = tags;
        }
        if let Some(featured) = patch.featured {
            draft.featured = featured;
        }
        if let Some(published) = patch.published {
            draft.published = published;
        }
        if patch.trip_id.is_some() {
            draft.trip_id = patch.trip_id;
        }
    }

    fn build(id: Uuid, draft: &NewsDraft, now: DateTime<Utc>) -> Self {
        let mut news = News {
            id,
            code: draft.code.clone(),
            title: String::new(),
            category: draft.category,
            author_id: draft.author_id,
            author_name: None,
            publish_date: draft.publish_date,
            image: String::new(),
            summary: String::new(),
            content: String::new(),
            tags: Vec::new(),
            featured: false,
            published: true,
            trip_id: None,
            schema_version: 1,
            created_at: now,
            updated_at: now,
        };
        news.overwrite(draft, now);
        news
    }

    fn overwrite(&mut self, draft: &NewsDraft, now: DateTime<Utc>) {
        self.title = draft.title.clone();
        self.category = draft.category;
        self.author_name = draft.author_name.clone();
        self.publish_date = draft.publish_date;
        self.image = draft.image.clone();
        self.summary = draft.summary.clone();
        self.content = draft.content.clone();
        self.tags = draft.tags.clone();
        self.featured = draft.featured;
        self.published = draft.published;
        self.trip_id = draft.trip_id;
        self.updated_at = now;
    }
}
