use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use travlr_core::news::{News, NewsDraft};
use travlr_core::{AppError, Page, Resource};

use super::catalog;
use super::{admin, public};
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::dto::NewsQuery;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let reads = Router::new()
        .route("/news", get(list_news))
        .route("/news/{code}", get(get_article));

    let writes = Router::new()
        .route("/news", post(create_article))
        .route(
            "/news/{code}",
            put(catalog::update::<News>).delete(catalog::remove::<News>),
        );

    public(reads, state.clone()).merge(admin(writes, state))
}

pub async fn list_news(
    State(state): State<Arc<AppState>>,
    caller: MaybeAuthUser,
    query: Result<Query<NewsQuery>, QueryRejection>,
) -> Result<Json<Page<News>>, ApiError> {
    let Query(query) = query?;
    let filter = query.filter(caller.is_admin());
    let page = state.news().list(&filter, query.page()).await?;
    Ok(Json(page))
}

/// Unpublished articles are only visible to admins.
pub async fn get_article(
    State(state): State<Arc<AppState>>,
    caller: MaybeAuthUser,
    Path(code): Path<String>,
) -> Result<Json<News>, ApiError> {
    let article = state.news().get_by_code(&code).await?;
    if !article.published && !caller.is_admin() {
        return Err(AppError::NotFound(News::NAME).into());
    }
    Ok(Json(article))
}

/// The author is always the calling admin, whatever the body says.
pub async fn create_article(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    body: Result<Json<NewsDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<News>), ApiError> {
    let Json(draft) = body?;
    let draft = draft.with_author(claims.user_id, claims.name);
    let article = state.news().create(draft, Some(claims.user_id)).await?;
    Ok((StatusCode::CREATED, Json(article)))
}
