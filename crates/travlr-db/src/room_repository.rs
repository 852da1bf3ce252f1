use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use travlr_core::error::AppError;
use travlr_core::pagination::Window;
use travlr_core::resource::ResourceStore;
use travlr_core::room::{Room, RoomDraft, RoomFilter};

use crate::query::{db_error, push_search, push_window};

const COLUMNS: &str = "id, code, name, room_type, beds, max_occupancy, price_per_night, image, \
                       description, amenities, available, trip_id, schema_version, created_at, \
                       updated_at";

#[derive(Clone)]
pub struct RoomRepository {
    pool: Pool<Postgres>,
}

impl RoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RoomRow {
    id: Uuid,
    code: String,
    name: String,
    room_type: String,
    beds: i32,
    max_occupancy: i32,
    price_per_night: f64,
    image: String,
    description: String,
    amenities: Vec<String>,
    available: bool,
    trip_id: Option<Uuid>,
    schema_version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RoomRow> for Room {
    type Error = AppError;

    fn try_from(row: RoomRow) -> Result<Self, Self::Error> {
        Ok(Room {
            id: row.id,
            code: row.code,
            name: row.name,
            room_type: row.room_type.parse().map_err(AppError::DatabaseError)?,
            beds: row.beds,
            max_occupancy: row.max_occupancy,
            price_per_night: row.price_per_night,
            image: row.image,
            description: row.description,
            amenities: row.amenities,
            available: row.available,
            trip_id: row.trip_id,
            schema_version: row.schema_version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl ResourceStore<Room> for RoomRepository {
    async fn fetch_window(&self, filter: &RoomFilter, window: &Window) -> Result<Vec<Room>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM rooms WHERE TRUE"));
        if filter.only_available {
            qb.push(" AND available");
        }
        push_search(&mut qb, filter.search.as_deref());
        push_window(&mut qb, window);

        let rows = qb
            .build_query_as::<RoomRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(Room::try_from).collect()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Room>, AppError> {
        let row = sqlx::query_as::<_, RoomRow>(&format!(
            "SELECT {COLUMNS} FROM rooms WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Room::try_from).transpose()
    }

    async fn insert(&self, draft: &RoomDraft) -> Result<Room, AppError> {
        let row = sqlx::query_as::<_, RoomRow>(&format!(
            r#"
            INSERT INTO rooms (code, name, room_type, beds, max_occupancy, price_per_night,
                               image, description, amenities, available, trip_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&draft.code)
        .bind(&draft.name)
        .bind(draft.room_type.as_str())
        .bind(draft.beds)
        .bind(draft.max_occupancy)
        .bind(draft.price_per_night)
        .bind(&draft.image)
        .bind(&draft.description)
        .bind(&draft.amenities)
        .bind(draft.available)
        .bind(draft.trip_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Room::try_from(row)
    }

    async fn update(&self, code: &str, draft: &RoomDraft) -> Result<Option<Room>, AppError> {
        let row = sqlx::query_as::<_, RoomRow>(&format!(
            r#"
            UPDATE rooms
            SET name = $2, room_type = $3, beds = $4, max_occupancy = $5, price_per_night = $6,
                image = $7, description = $8, amenities = $9, available = $10, trip_id = $11,
                updated_at = NOW()
            WHERE code = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(code)
        .bind(&draft.name)
        .bind(draft.room_type.as_str())
        .bind(draft.beds)
        .bind(draft.max_occupancy)
        .bind(draft.price_per_night)
        .bind(&draft.image)
        .bind(&draft.description)
        .bind(&draft.amenities)
        .bind(draft.available)
        .bind(draft.trip_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Room::try_from).transpose()
    }

    async fn delete(&self, code: &str) -> Result<Option<Room>, AppError> {
        let row = sqlx::query_as::<_, RoomRow>(&format!(
            "DELETE FROM rooms WHERE code = $1 RETURNING {COLUMNS}"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Room::try_from).transpose()
    }
}
