use sqlx::{PgPool, Pool, Postgres};

use travlr_core::analytics::{
    AnalyticsStore, CuisinePriceStats, DateRange, ResortMonthCount, RoomAvailability,
};
use travlr_core::error::AppError;

use crate::query::db_error;

/// Aggregate reports computed in PostgreSQL.
#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: Pool<Postgres>,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ResortMonthRow {
    resort: String,
    year: i32,
    month: i32,
    trip_count: i64,
}

#[derive(sqlx::FromRow)]
struct CuisineRow {
    cuisine: String,
    avg_price: f64,
    min_price: f64,
    max_price: f64,
    count: i64,
}

#[derive(sqlx::FromRow)]
struct AvailabilityRow {
    room_type: String,
    available: bool,
    count: i64,
}

impl AnalyticsStore for AnalyticsRepository {
    async fn trips_by_resort_month(
        &self,
        range: DateRange,
    ) -> Result<Vec<ResortMonthCount>, AppError> {
        let rows = sqlx::query_as::<_, ResortMonthRow>(
            r#"
            SELECT resort,
                   EXTRACT(YEAR FROM start_date AT TIME ZONE 'UTC')::INT AS year,
                   EXTRACT(MONTH FROM start_date AT TIME ZONE 'UTC')::INT AS month,
                   COUNT(*) AS trip_count
            FROM trips
            WHERE ($1::TIMESTAMPTZ IS NULL OR start_date >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR start_date <= $2)
            GROUP BY 1, 2, 3
            ORDER BY resort COLLATE "C", year, month
            "#,
        )
        .bind(range.start_date)
        .bind(range.end_date)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| ResortMonthCount {
                resort: row.resort,
                year: row.year,
                month: row.month as u32,
                trip_count: row.trip_count,
            })
            .collect())
    }

    async fn meal_price_stats(&self) -> Result<Vec<CuisinePriceStats>, AppError> {
        let rows = sqlx::query_as::<_, CuisineRow>(
            r#"
            SELECT cuisine,
                   AVG(price) AS avg_price,
                   MIN(price) AS min_price,
                   MAX(price) AS max_price,
                   COUNT(*) AS count
            FROM meals
            GROUP BY cuisine
            ORDER BY avg_price DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| CuisinePriceStats {
                cuisine: row.cuisine,
                avg_price: row.avg_price,
                min_price: row.min_price,
                max_price: row.max_price,
                count: row.count,
            })
            .collect())
    }

    async fn room_availability(&self) -> Result<Vec<RoomAvailability>, AppError> {
        let rows = sqlx::query_as::<_, AvailabilityRow>(
            r#"
            SELECT room_type, available, COUNT(*) AS count
            FROM rooms
            GROUP BY room_type, available
            ORDER BY room_type COLLATE "C", available DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(RoomAvailability {
                    room_type: row.room_type.parse().map_err(AppError::DatabaseError)?,
                    available: row.available,
                    count: row.count,
                })
            })
            .collect()
    }
}
