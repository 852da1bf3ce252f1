use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use travlr_core::AppError;

use crate::analytics_repository::AnalyticsRepository;
use crate::audit_repository::AuditRepository;
use crate::config::DatabaseConfig;
use crate::meal_repository::MealRepository;
use crate::news_repository::NewsRepository;
use crate::query::db_error;
use crate::room_repository::RoomRepository;
use crate::trip_repository::TripRepository;
use crate::user_repository::UserRepository;

/// Central database facade: owns the connection pool, runs migrations,
/// and vends repository instances.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL with the given configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))?;

        tracing::info!(max_connections = config.max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Create a `Database` from an existing pool (useful for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    /// Remove every row from every table. Used before seeding.
    pub async fn clear_all(&self) -> Result<(), AppError> {
        sqlx::query("TRUNCATE audit_log, news, meals, rooms, trips, users CASCADE")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        tracing::warn!("Cleared all tables");
        Ok(())
    }

    pub fn trips(&self) -> TripRepository {
        TripRepository::new(self.pool.clone())
    }

    pub fn rooms(&self) -> RoomRepository {
        RoomRepository::new(self.pool.clone())
    }

    pub fn meals(&self) -> MealRepository {
        MealRepository::new(self.pool.clone())
    }

    pub fn news(&self) -> NewsRepository {
        NewsRepository::new(self.pool.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn audit(&self) -> AuditRepository {
        AuditRepository::new(self.pool.clone())
    }

    pub fn analytics(&self) -> AnalyticsRepository {
        AnalyticsRepository::new(self.pool.clone())
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
