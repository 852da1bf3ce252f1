use serde::{Deserialize, Serialize};

use travlr_core::meal::{MealFilter, MealType};
use travlr_core::news::{NewsCategory, NewsFilter};
use travlr_core::room::RoomFilter;
use travlr_core::trip::TripFilter;
use travlr_core::user::{Role, User};
use travlr_core::validation::FieldError;
use travlr_core::{Cursor, PageRequest};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ErrorDetails {
    Fields(Vec<FieldError>),
    Roles {
        #[serde(rename = "requiredRoles")]
        required_roles: Vec<Role>,
        #[serde(rename = "userRole")]
        user_role: Role,
    },
    Field {
        field: String,
    },
    /// Underlying error text, only sent in development.
    Internal(String),
}

// ---------------------------------------------------------------------------
// List queries
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct TripQuery {
    pub limit: Option<usize>,
    pub cursor: Option<Cursor>,
    pub q: Option<String>,
}

impl TripQuery {
    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.limit, self.cursor)
    }

    pub fn filter(&self) -> TripFilter {
        TripFilter {
            search: non_blank(&self.q),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomQuery {
    pub limit: Option<usize>,
    pub cursor: Option<Cursor>,
    pub q: Option<String>,
    #[serde(default)]
    pub only_available: bool,
}

impl RoomQuery {
    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.limit, self.cursor)
    }

    pub fn filter(&self) -> RoomFilter {
        RoomFilter {
            search: non_blank(&self.q),
            only_available: self.only_available,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealQuery {
    pub limit: Option<usize>,
    pub cursor: Option<Cursor>,
    pub q: Option<String>,
    #[serde(default)]
    pub only_available: bool,
    pub meal_type: Option<MealType>,
    pub cuisine: Option<String>,
}

impl MealQuery {
    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.limit, self.cursor)
    }

    pub fn filter(&self) -> MealFilter {
        MealFilter {
            search: non_blank(&self.q),
            only_available: self.only_available,
            meal_type: self.meal_type,
            cuisine: non_blank(&self.cuisine),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    pub limit: Option<usize>,
    pub cursor: Option<Cursor>,
    pub q: Option<String>,
    pub category: Option<NewsCategory>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
}

impl NewsQuery {
    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.limit, self.cursor)
    }

    /// Non-admins only ever see published articles; admins may ask for drafts.
    pub fn filter(&self, is_admin: bool) -> NewsFilter {
        let published = if is_admin {
            self.published.unwrap_or(true)
        } else {
            true
        };
        NewsFilter {
            search: non_blank(&self.q),
            category: self.category,
            featured: self.featured,
            published: Some(published),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Resource responses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DeletedResponse<T> {
    pub message: String,
    pub item: T,
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse<T> {
    pub items: Vec<T>,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: &'static str,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: User,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub message: &'static str,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}
