use travlr_core::meal::Meal;
use travlr_core::news::News;
use travlr_core::room::Room;
use travlr_core::trip::Trip;
use travlr_core::{AuthService, ResourceService, TokenService};
use travlr_db::{
    AuditRepository, Database, MealRepository, NewsRepository, RoomRepository, TripRepository,
    UserRepository,
};

use crate::config::ServerConfig;

pub type TripService = ResourceService<Trip, TripRepository, AuditRepository>;
pub type RoomService = ResourceService<Room, RoomRepository, AuditRepository>;
pub type MealService = ResourceService<Meal, MealRepository, AuditRepository>;
pub type NewsService = ResourceService<News, NewsRepository, AuditRepository>;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub db: Database,
    pub tokens: TokenService,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(db: Database, tokens: TokenService, config: ServerConfig) -> Self {
        Self { db, tokens, config }
    }

    pub fn auth(&self) -> AuthService<UserRepository> {
        AuthService::new(self.db.users(), self.tokens.clone())
    }

    pub fn trips(&self) -> TripService {
        ResourceService::new(self.db.trips(), self.db.audit())
    }

    pub fn rooms(&self) -> RoomService {
        ResourceService::new(self.db.rooms(), self.db.audit())
    }

    pub fn meals(&self) -> MealService {
        ResourceService::new(self.db.meals(), self.db.audit())
    }

    pub fn news(&self) -> NewsService {
        ResourceService::new(self.db.news(), self.db.audit())
    }
}
