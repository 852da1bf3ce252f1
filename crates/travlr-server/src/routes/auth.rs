use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};

use travlr_core::AppError;
use travlr_core::user::{Registration, User};

use crate::auth::{AuthUser, authenticate};
use crate::dto::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterResponse};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let open = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh));

    let private = Router::new()
        .route("/auth/profile", get(profile))
        .route_layer(middleware::from_fn_with_state(state, authenticate));

    open.merge(private)
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(registration) = body?;
    let tokens = state.auth().register(registration).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            token: tokens.token,
            refresh_token: tokens.refresh_token,
        }),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = body?;
    let outcome = state.auth().login(&request.email, &request.password).await?;
    Ok(Json(LoginResponse {
        message: "Login successful",
        user: outcome.user,
        token: outcome.tokens.token,
        refresh_token: outcome.tokens.refresh_token,
    }))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let Json(request) = body?;
    if request.refresh_token.trim().is_empty() {
        return Err(AppError::BadRequest("Refresh token is required".into()).into());
    }
    let token = state.auth().refresh(&request.refresh_token).await?;
    Ok(Json(RefreshResponse {
        message: "Token refreshed successfully",
        token,
    }))
}

pub async fn profile(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<User>, ApiError> {
    let user = state.auth().profile(claims.user_id).await?;
    Ok(Json(user))
}
