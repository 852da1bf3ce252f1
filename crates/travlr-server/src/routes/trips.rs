use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};

use travlr_core::Page;
use travlr_core::trip::Trip;

use super::catalog;
use super::{admin, public};
use crate::dto::TripQuery;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let reads = Router::new()
        .route("/trips", get(list_trips))
        .route("/trips/{code}", get(catalog::get_one::<Trip>));

    let writes = Router::new()
        .route("/trips", post(catalog::create::<Trip>))
        .route(
            "/trips/{code}",
            put(catalog::update::<Trip>).delete(catalog::remove::<Trip>),
        );

    public(reads, state.clone()).merge(admin(writes, state))
}

pub async fn list_trips(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TripQuery>, QueryRejection>,
) -> Result<Json<Page<Trip>>, ApiError> {
    let Query(query) = query?;
    let page = state.trips().list(&query.filter(), query.page()).await?;
    Ok(Json(page))
}
