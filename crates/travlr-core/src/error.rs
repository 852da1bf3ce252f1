use thiserror::Error;

use crate::user::Role;
use crate::validation::ValidationErrors;

/// Application-wide error types for Travlr.
#[derive(Error, Debug)]
pub enum AppError {
    /// One or more fields failed validation.
    #[error("Validation failed")]
    ValidationError(ValidationErrors),

    /// Request was syntactically fine but semantically unusable.
    #[error("{0}")]
    BadRequest(String),

    /// No `Authorization` header (or an empty bearer token).
    #[error("Access denied. No token provided.")]
    MissingToken,

    /// `Authorization` header present but not `Bearer <token>`.
    #[error("Invalid authorization header format. Expected: Bearer <token>")]
    MalformedAuthHeader,

    #[error("Token expired. Please refresh your token.")]
    ExpiredToken,

    /// Bad signature, wrong shape, or otherwise undecodable token.
    #[error("Invalid token.")]
    InvalidToken,

    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but the caller's role is not in the allowed set.
    #[error("Access denied. Insufficient permissions.")]
    Forbidden { required: Vec<Role>, actual: Role },

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unique key violation.
    #[error("{field} already exists")]
    Conflict { field: String },

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true for errors caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AppError::DatabaseError(_)
                | AppError::ConfigError(_)
                | AppError::SerializationError(_)
                | AppError::Generic(_)
        )
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::ValidationError(errors)
    }
}
