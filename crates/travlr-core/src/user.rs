use std::fmt;
use std::future::Future;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::{Mode, Validate, ValidationErrors, Validator, is_email};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// An account. The password hash never leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub schema_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user ready to be inserted; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password_hash: String,
}

/// Self-service sign-up payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<Role>,
}

impl Validate for Registration {
    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
    }

    fn validate(&self, _mode: Mode) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("name", &self.name, "Name is required")
            .length("name", &self.name, 2, 100)
            .required("email", &self.email, "Email is required");
        if !self.email.is_empty() {
            v.check(is_email(&self.email), "email", "Please provide a valid email address");
        }
        v.check(
            self.password.chars().count() >= 8,
            "password",
            "Password must be at least 8 characters long",
        )
        .check(
            self.password.chars().any(|c| c.is_ascii_uppercase())
                && self.password.chars().any(|c| c.is_ascii_lowercase())
                && self.password.chars().any(|c| c.is_ascii_digit()),
            "password",
            "Password must contain at least one uppercase letter, one lowercase letter, and one number",
        );
        v.finish()
    }
}

pub trait UserStore: Send + Sync + Clone {
    fn find_by_email(&self, email: &str)
    -> impl Future<Output = Result<Option<User>, AppError>> + Send;

    fn find_by_id(&self, id: Uuid) -> impl Future<Output = Result<Option<User>, AppError>> + Send;

    /// Duplicate email is `AppError::Conflict { field: "email" }`.
    fn insert(&self, user: &NewUser) -> impl Future<Output = Result<User, AppError>> + Send;
}
