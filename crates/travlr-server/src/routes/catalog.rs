//! Handlers shared by every catalog resource. Each resource module mounts
//! these for its own type and adds its list handler.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;

use travlr_core::meal::Meal;
use travlr_core::news::News;
use travlr_core::room::Room;
use travlr_core::trip::Trip;
use travlr_core::{Resource, ResourceService, ResourceStore};
use travlr_db::{AuditRepository, MealRepository, NewsRepository, RoomRepository, TripRepository};

use crate::auth::AuthUser;
use crate::dto::DeletedResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// A resource served over HTTP, with its service built from shared state.
pub trait Catalog: Resource + Serialize {
    type Store: ResourceStore<Self> + 'static;

    fn service(state: &AppState) -> ResourceService<Self, Self::Store, AuditRepository>;
}

impl Catalog for Trip {
    type Store = TripRepository;

    fn service(state: &AppState) -> ResourceService<Self, Self::Store, AuditRepository> {
        state.trips()
    }
}

impl Catalog for Room {
    type Store = RoomRepository;

    fn service(state: &AppState) -> ResourceService<Self, Self::Store, AuditRepository> {
        state.rooms()
    }
}

impl Catalog for Meal {
    type Store = MealRepository;

    fn service(state: &AppState) -> ResourceService<Self, Self::Store, AuditRepository> {
        state.meals()
    }
}

impl Catalog for News {
    type Store = NewsRepository;

    fn service(state: &AppState) -> ResourceService<Self, Self::Store, AuditRepository> {
        state.news()
    }
}

pub async fn get_one<R: Catalog>(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<R>, ApiError> {
    let item = R::service(&state).get_by_code(&code).await?;
    Ok(Json(item))
}

pub async fn create<R>(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    body: Result<Json<R::Draft>, JsonRejection>,
) -> Result<(StatusCode, Json<R>), ApiError>
where
    R: Catalog,
    R::Draft: DeserializeOwned,
{
    let Json(draft) = body?;
    let item = R::service(&state)
        .create(draft, Some(claims.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update<R>(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(code): Path<String>,
    body: Result<Json<R::Patch>, JsonRejection>,
) -> Result<Json<R>, ApiError>
where
    R: Catalog,
    R::Patch: DeserializeOwned,
{
    let Json(patch) = body?;
    let item = R::service(&state)
        .update(&code, patch, Some(claims.user_id))
        .await?;
    Ok(Json(item))
}

pub async fn remove<R: Catalog>(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(code): Path<String>,
) -> Result<Json<DeletedResponse<R>>, ApiError> {
    let item = R::service(&state)
        .delete(&code, Some(claims.user_id))
        .await?;
    Ok(Json(DeletedResponse {
        message: format!("{} deleted successfully", R::NAME),
        item,
    }))
}
