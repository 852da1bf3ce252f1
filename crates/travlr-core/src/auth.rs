use uuid::Uuid;

use crate::error::AppError;
use crate::password;
use crate::token::{TokenPair, TokenService};
use crate::user::{NewUser, Registration, User, UserStore};
use crate::validation::{Mode, Validate};

/// Successful login: the account plus a fresh token pair.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub tokens: TokenPair,
}

/// Account registration, login, and token refresh.
#[derive(Clone)]
pub struct AuthService<U> {
    users: U,
    tokens: TokenService,
}

impl<U: UserStore> AuthService<U> {
    pub fn new(users: U, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn register(&self, mut registration: Registration) -> Result<TokenPair, AppError> {
        registration.normalize();
        registration.validate(Mode::Create)?;

        let password_hash = password::hash_async(registration.password).await?;
        let user = self
            .users
            .insert(&NewUser {
                email: registration.email,
                name: registration.name,
                role: registration.role.unwrap_or_default(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "Registered user");
        self.tokens.issue_pair(&user)
    }

    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::InvalidCredentials);
        }

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let valid =
            password::verify_async(password.to_string(), user.password_hash.clone()).await?;
        if !valid {
            tracing::debug!(user_id = %user.id, "Rejected login: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let tokens = self.tokens.issue_pair(&user)?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome { user, tokens })
    }

    /// Exchange a refresh token for a new access token bound to the
    /// current state of the same user.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let claims = self
            .tokens
            .verify_refresh(refresh_token)
            .map_err(|_| AppError::InvalidRefreshToken)?;
        if !claims.is_refresh() {
            return Err(AppError::InvalidRefreshToken);
        }

        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or(AppError::InvalidRefreshToken)?;

        self.tokens.issue_access(&user)
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".into()))
    }
}
