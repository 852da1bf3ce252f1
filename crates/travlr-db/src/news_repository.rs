use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use travlr_core::error::AppError;
use travlr_core::news::{News, NewsDraft, NewsFilter};
use travlr_core::pagination::Window;
use travlr_core::resource::ResourceStore;

use crate::query::{db_error, push_search, push_window};

const COLUMNS: &str = "id, code, title, category, author_id, author_name, publish_date, image, \
                       summary, content, tags, featured, published, trip_id, schema_version, \
                       created_at, updated_at";

#[derive(Clone)]
pub struct NewsRepository {
    pool: Pool<Postgres>,
}

impl NewsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct NewsRow {
    id: Uuid,
    code: String,
    title: String,
    category: String,
    author_id: Uuid,
    author_name: Option<String>,
    publish_date: DateTime<Utc>,
    image: String,
    summary: String,
    content: String,
    tags: Vec<String>,
    featured: bool,
    published: bool,
    trip_id: Option<Uuid>,
    schema_version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<NewsRow> for News {
    type Error = AppError;

    fn try_from(row: NewsRow) -> Result<Self, Self::Error> {
        Ok(News {
            id: row.id,
            code: row.code,
            title: row.title,
            category: row.category.parse().map_err(AppError::DatabaseError)?,
            author_id: row.author_id,
            author_name: row.author_name,
            publish_date: row.publish_date,
            image: row.image,
            summary: row.summary,
            content: row.content,
            tags: row.tags,
            featured: row.featured,
            published: row.published,
            trip_id: row.trip_id,
            schema_version: row.schema_version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl ResourceStore<News> for NewsRepository {
    async fn fetch_window(&self, filter: &NewsFilter, window: &Window) -> Result<Vec<News>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM news WHERE TRUE"));
        if let Some(category) = filter.category {
            qb.push(" AND category = ").push_bind(category.as_str());
        }
        if let Some(featured) = filter.featured {
            qb.push(" AND featured = ").push_bind(featured);
        }
        if let Some(published) = filter.published {
            qb.push(" AND published = ").push_bind(published);
        }
        push_search(&mut qb, filter.search.as_deref());
        push_window(&mut qb, window);

        let rows = qb
            .build_query_as::<NewsRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(News::try_from).collect()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<News>, AppError> {
        let row = sqlx::query_as::<_, NewsRow>(&format!(
            "SELECT {COLUMNS} FROM news WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(News::try_from).transpose()
    }

    async fn insert(&self, draft: &NewsDraft) -> Result<News, AppError> {
        let row = sqlx::query_as::<_, NewsRow>(&format!(
            r#"
            INSERT INTO news (code, title, category, author_id, author_name, publish_date, image,
                              summary, content, tags, featured, published, trip_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&draft.code)
        .bind(&draft.title)
        .bind(draft.category.as_str())
        .bind(draft.author_id)
        .bind(&draft.author_name)
        .bind(draft.publish_date)
        .bind(&draft.image)
        .bind(&draft.summary)
        .bind(&draft.content)
        .bind(&draft.tags)
        .bind(draft.featured)
        .bind(draft.published)
        .bind(draft.trip_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        News::try_from(row)
    }

    /// The author never changes after creation.
    async fn update(&self, code: &str, draft: &NewsDraft) -> Result<Option<News>, AppError> {
        let row = sqlx::query_as::<_, NewsRow>(&format!(
            r#"
            UPDATE news
            SET title = $2, category = $3, publish_date = $4, image = $5, summary = $6,
                content = $7, tags = $8, featured = $9, published = $10, trip_id = $11,
                updated_at = NOW()
            WHERE code = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(code)
        .bind(&draft.title)
        .bind(draft.category.as_str())
        .bind(draft.publish_date)
        .bind(&draft.image)
        .bind(&draft.summary)
        .bind(&draft.content)
        .bind(&draft.tags)
        .bind(draft.featured)
        .bind(draft.published)
        .bind(draft.trip_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(News::try_from).transpose()
    }

    async fn delete(&self, code: &str) -> Result<Option<News>, AppError> {
        let row = sqlx::query_as::<_, NewsRow>(&format!(
            "DELETE FROM news WHERE code = $1 RETURNING {COLUMNS}"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(News::try_from).transpose()
    }
}
