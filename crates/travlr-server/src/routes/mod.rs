//! HTTP surface: every API route lives under `/api/v1`, plus `/health`.

pub mod analytics;
pub mod auth;
pub mod catalog;
pub mod meals;
pub mod news;
pub mod rooms;
pub mod trips;

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{authenticate, optional_auth, require_admin};
use crate::dto::HealthResponse;
use crate::error::reveal_internal_errors;
use crate::state::AppState;

/// Build the full router with all routes and route-level middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(trips::router(state.clone()))
        .merge(rooms::router(state.clone()))
        .merge(meals::router(state.clone()))
        .merge(news::router(state.clone()))
        .merge(auth::router(state.clone()))
        .merge(analytics::router(state.clone()));

    let mut app = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .with_state(state.clone());

    if state.config.is_development() {
        app = app.layer(middleware::from_fn(reveal_internal_errors));
    }
    app
}

/// [`router`] plus the request-level stack: tracing, CORS, and body limit.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config.cors_origins.as_deref());
    let body_limit = state.config.body_limit;

    router(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let Some(origins) = origins else {
        return CorsLayer::permissive();
    };

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Routes open to everyone; claims are attached when a valid token is sent.
fn public(routes: Router<Arc<AppState>>, state: Arc<AppState>) -> Router<Arc<AppState>> {
    routes.route_layer(middleware::from_fn_with_state(state, optional_auth))
}

/// Routes that need an admin token. `authenticate` runs before `require_admin`.
fn admin(routes: Router<Arc<AppState>>, state: Arc<AppState>) -> Router<Arc<AppState>> {
    routes
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, authenticate))
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_status = match state.db.health_check().await {
        Ok(()) => "ok",
        Err(err) => {
            tracing::warn!(error = %err, "Health check failed");
            "error"
        }
    };

    let status = if db_status == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if db_status == "ok" {
            "healthy"
        } else {
            "unhealthy"
        },
        database: db_status,
    };

    (status, Json(response))
}
