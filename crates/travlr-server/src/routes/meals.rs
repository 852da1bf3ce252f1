use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};

use travlr_core::Page;
use travlr_core::meal::Meal;

use super::catalog;
use super::{admin, public};
use crate::dto::MealQuery;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let reads = Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/{code}", get(catalog::get_one::<Meal>));

    let writes = Router::new()
        .route("/meals", post(catalog::create::<Meal>))
        .route(
            "/meals/{code}",
            put(catalog::update::<Meal>).delete(catalog::remove::<Meal>),
        );

    public(reads, state.clone()).merge(admin(writes, state))
}

pub async fn list_meals(
    State(state): State<Arc<AppState>>,
    query: Result<Query<MealQuery>, QueryRejection>,
) -> Result<Json<Page<Meal>>, ApiError> {
    let Query(query) = query?;
    let page = state.meals().list(&query.filter(), query.page()).await?;
    Ok(Json(page))
}
