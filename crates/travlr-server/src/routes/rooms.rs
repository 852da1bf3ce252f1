use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};

use travlr_core::Page;
use travlr_core::room::Room;

use super::catalog;
use super::{admin, public};
use crate::dto::RoomQuery;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let reads = Router::new()
        .route("/rooms", get(list_rooms))
        .route("/rooms/{code}", get(catalog::get_one::<Room>));

    let writes = Router::new()
        .route("/rooms", post(catalog::create::<Room>))
        .route(
            "/rooms/{code}",
            put(catalog::update::<Room>).delete(catalog::remove::<Room>),
        );

    public(reads, state.clone()).merge(admin(writes, state))
}

pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RoomQuery>, QueryRejection>,
) -> Result<Json<Page<Room>>, ApiError> {
    let Query(query) = query?;
    let page = state.rooms().list(&query.filter(), query.page()).await?;
    Ok(Json(page))
}
