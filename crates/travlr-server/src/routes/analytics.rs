use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::middleware;
use axum::routing::get;
use axum::{Json, Router};

use travlr_core::analytics::{
    AnalyticsStore, CuisinePriceStats, DateRange, ResortMonthCount, RoomAvailability,
};

use crate::auth::authenticate;
use crate::dto::ItemsResponse;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/analytics/trips-by-resort", get(trips_by_resort))
        .route("/analytics/meal-price-stats", get(meal_price_stats))
        .route("/analytics/room-availability", get(room_availability))
        .route_layer(middleware::from_fn_with_state(state, authenticate))
}

pub async fn trips_by_resort(
    State(state): State<Arc<AppState>>,
    range: Result<Query<DateRange>, QueryRejection>,
) -> Result<Json<ItemsResponse<ResortMonthCount>>, ApiError> {
    let Query(range) = range?;
    let items = state.db.analytics().trips_by_resort_month(range).await?;
    Ok(Json(ItemsResponse { items }))
}

pub async fn meal_price_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ItemsResponse<CuisinePriceStats>>, ApiError> {
    let items = state.db.analytics().meal_price_stats().await?;
    Ok(Json(ItemsResponse { items }))
}

pub async fn room_availability(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ItemsResponse<RoomAvailability>>, ApiError> {
    let items = state.db.analytics().room_availability().await?;
    Ok(Json(ItemsResponse { items }))
}
