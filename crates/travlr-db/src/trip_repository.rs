use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use travlr_core::error::AppError;
use travlr_core::pagination::Window;
use travlr_core::resource::ResourceStore;
use travlr_core::trip::{Trip, TripDraft, TripFilter};

use crate::query::{db_error, push_search, push_window};

const COLUMNS: &str = "id, code, name, length, start_date, resort, per_person, image, \
                       description, schema_version, created_at, updated_at";

#[derive(Clone)]
pub struct TripRepository {
    pool: Pool<Postgres>,
}

impl TripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct TripRow {
    id: Uuid,
    code: String,
    name: String,
    length: i32,
    start_date: DateTime<Utc>,
    resort: String,
    per_person: f64,
    image: String,
    description: String,
    schema_version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TripRow> for Trip {
    fn from(row: TripRow) -> Self {
        Trip {
            id: row.id,
            code: row.code,
            name: row.name,
            length: row.length,
            start: row.start_date,
            resort: row.resort,
            per_person: row.per_person,
            image: row.image,
            description: row.description,
            schema_version: row.schema_version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl ResourceStore<Trip> for TripRepository {
    async fn fetch_window(&self, filter: &TripFilter, window: &Window) -> Result<Vec<Trip>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM trips WHERE TRUE"));
        push_search(&mut qb, filter.search.as_deref());
        push_window(&mut qb, window);

        let rows = qb
            .build_query_as::<TripRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Trip>, AppError> {
        let row = sqlx::query_as::<_, TripRow>(&format!(
            "SELECT {COLUMNS} FROM trips WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    async fn insert(&self, draft: &TripDraft) -> Result<Trip, AppError> {
        let row = sqlx::query_as::<_, TripRow>(&format!(
            r#"
            INSERT INTO trips (code, name, length, start_date, resort, per_person, image, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&draft.code)
        .bind(&draft.name)
        .bind(draft.length)
        .bind(draft.start)
        .bind(&draft.resort)
        .bind(draft.per_person)
        .bind(&draft.image)
        .bind(&draft.description)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn update(&self, code: &str, draft: &TripDraft) -> Result<Option<Trip>, AppError> {
        let row = sqlx::query_as::<_, TripRow>(&format!(
            r#"
            UPDATE trips
            SET name = $2, length = $3, start_date = $4, resort = $5, per_person = $6,
                image = $7, description = $8, updated_at = NOW()
            WHERE code = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(code)
        .bind(&draft.name)
        .bind(draft.length)
        .bind(draft.start)
        .bind(&draft.resort)
        .bind(draft.per_person)
        .bind(&draft.image)
        .bind(&draft.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, code: &str) -> Result<Option<Trip>, AppError> {
        let row = sqlx::query_as::<_, TripRow>(&format!(
            "DELETE FROM trips WHERE code = $1 RETURNING {COLUMNS}"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Into::into))
    }
}
