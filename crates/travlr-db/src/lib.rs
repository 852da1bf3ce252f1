pub mod analytics_repository;
pub mod audit_repository;
pub mod config;
pub mod database;
pub mod meal_repository;
pub mod news_repository;
mod query;
pub mod room_repository;
pub mod trip_repository;
pub mod user_repository;

pub use analytics_repository::AnalyticsRepository;
pub use audit_repository::AuditRepository;
pub use config::DatabaseConfig;
pub use database::Database;
pub use meal_repository::MealRepository;
pub use news_repository::NewsRepository;
pub use room_repository::RoomRepository;
pub use trip_repository::TripRepository;
pub use user_repository::UserRepository;
