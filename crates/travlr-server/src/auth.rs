use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use travlr_core::{AccessClaims, AppError, Role};

use crate::error::ApiError;
use crate::state::AppState;

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// An absent header or empty token is `MissingToken`; anything that is not
/// exactly two space-separated parts starting with `Bearer` is malformed.
pub fn parse_bearer(header: Option<&HeaderValue>) -> Result<&str, AppError> {
    let raw = match header {
        None => return Err(AppError::MissingToken),
        Some(value) => value.to_str().map_err(|_| AppError::MalformedAuthHeader)?,
    };
    if raw.is_empty() {
        return Err(AppError::MissingToken);
    }

    let mut parts = raw.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(""), None) => Err(AppError::MissingToken),
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(AppError::MalformedAuthHeader),
    }
}

fn verify(state: &AppState, headers: &HeaderMap) -> Result<AccessClaims, AppError> {
    let token = parse_bearer(headers.get(AUTHORIZATION))?;
    state.tokens.verify_access(token)
}

/// Middleware that requires a valid access token and attaches its claims.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = verify(&state, request.headers()).inspect_err(|err| {
        tracing::debug!(error = %err, path = %request.uri().path(), "Rejected request token");
    })?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Middleware that attaches claims when a valid token is present and
/// otherwise lets the request through untouched.
pub async fn optional_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Ok(claims) = verify(&state, request.headers()) {
        request.extensions_mut().insert(claims);
    }
    next.run(request).await
}

/// Check that the caller's role is one of `allowed`.
pub fn authorize<'a>(
    claims: Option<&'a AccessClaims>,
    allowed: &[Role],
) -> Result<&'a AccessClaims, AppError> {
    let claims = claims.ok_or_else(|| AppError::Unauthorized("Authentication required.".into()))?;
    if allowed.contains(&claims.role) {
        Ok(claims)
    } else {
        Err(AppError::Forbidden {
            required: allowed.to_vec(),
            actual: claims.role,
        })
    }
}

/// Middleware for admin-only routes. Must run after [`authenticate`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    if let Err(err) = authorize(request.extensions().get::<AccessClaims>(), &[Role::Admin]) {
        tracing::info!(error = %err, path = %request.uri().path(), "Denied admin route");
        return Err(err.into());
    }
    Ok(next.run(request).await)
}

/// Claims of an authenticated caller. Rejects with 401 when none are attached.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AccessClaims);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AccessClaims>()
            .cloned()
            .map(AuthUser)
            .ok_or(ApiError(AppError::MissingToken))
    }
}

/// Claims of the caller if [`optional_auth`] attached any.
#[derive(Debug, Clone, Default)]
pub struct MaybeAuthUser(pub Option<AccessClaims>);

impl MaybeAuthUser {
    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(|c| c.role == Role::Admin)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(parts.extensions.get::<AccessClaims>().cloned()))
    }
}
