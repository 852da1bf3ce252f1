//! JWT issuance and verification (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::user::{Role, User};

const REFRESH_TYPE: &str = "refresh";

/// Claims carried by an access token and attached to authenticated requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub email: String,
    /// `"refresh"` for tokens minted by [`TokenService::issue_refresh`].
    #[serde(rename = "type", default)]
    pub token_type: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl RefreshClaims {
    pub fn is_refresh(&self) -> bool {
        self.token_type.as_deref() == Some(REFRESH_TYPE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl TokenConfig {
    /// One secret for both token kinds, default lifetimes (1h / 7d).
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        Self {
            access_secret: secret.clone(),
            refresh_secret: secret,
            access_ttl: Duration::hours(1),
            refresh_ttl: Duration::days(7),
        }
    }

    /// Read `JWT_ACCESS_SECRET` (or `JWT_SECRET`), `JWT_REFRESH_SECRET`,
    /// `JWT_ACCESS_TTL` and `JWT_REFRESH_TTL`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let access_secret = non_empty("JWT_ACCESS_SECRET")
            .or_else(|| non_empty("JWT_SECRET"))
            .ok_or_else(|| {
                AppError::ConfigError("JWT_ACCESS_SECRET or JWT_SECRET must be set".into())
            })?;
        let refresh_secret = non_empty("JWT_REFRESH_SECRET").unwrap_or_else(|| access_secret.clone());

        let access_ttl = match non_empty("JWT_ACCESS_TTL") {
            Some(raw) => parse_ttl(&raw)?,
            None => Duration::hours(1),
        };
        let refresh_ttl = match non_empty("JWT_REFRESH_TTL") {
            Some(raw) => parse_ttl(&raw)?,
            None => Duration::days(7),
        };

        Ok(Self {
            access_secret,
            refresh_secret,
            access_ttl,
            refresh_ttl,
        })
    }
}

/// Parse `"3600"`, `"45s"`, `"15m"`, `"1h"` or `"7d"`.
pub fn parse_ttl(raw: &str) -> Result<Duration, AppError> {
    let raw = raw.trim();
    let invalid = || AppError::ConfigError(format!("invalid token lifetime: '{raw}'"));

    let (digits, unit) = match raw.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((idx, _)) => raw.split_at(idx),
        None => (raw, "s"),
    };
    let amount: i64 = digits.parse().map_err(|_| invalid())?;

    let ttl = match unit {
        "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        _ => None,
    };
    ttl.ok_or_else(invalid)
}

/// Signs and verifies access and refresh tokens.
#[derive(Clone)]
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn issue_access(&self, user: &User) -> Result<String, AppError> {
        let iat = Utc::now().timestamp();
        let claims = AccessClaims {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            iat,
            exp: iat + self.access_ttl.num_seconds(),
        };
        sign(&claims, &self.access_encoding)
    }

    pub fn issue_refresh(&self, user: &User) -> Result<String, AppError> {
        let iat = Utc::now().timestamp();
        let claims = RefreshClaims {
            user_id: user.id,
            email: user.email.clone(),
            token_type: Some(REFRESH_TYPE.to_string()),
            iat,
            exp: iat + self.refresh_ttl.num_seconds(),
        };
        sign(&claims, &self.refresh_encoding)
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            token: self.issue_access(user)?,
            refresh_token: self.issue_refresh(user)?,
        })
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, AppError> {
        decode::<AccessClaims>(token, &self.access_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(verification_error)
    }

    /// Signature and expiry only; callers still check [`RefreshClaims::is_refresh`].
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, AppError> {
        decode::<RefreshClaims>(token, &self.refresh_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(verification_error)
    }
}

fn sign<T: Serialize>(claims: &T, key: &EncodingKey) -> Result<String, AppError> {
    encode(&Header::new(Algorithm::HS256), claims, key)
        .map_err(|e| AppError::Generic(format!("Failed to sign token: {e}")))
}

fn verification_error(err: jsonwebtoken::errors::Error) -> AppError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AppError::ExpiredToken,
        _ => AppError::InvalidToken,
    }
}
