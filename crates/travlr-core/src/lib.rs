pub mod analytics;
pub mod audit;
pub mod auth;
pub mod error;
pub mod meal;
pub mod news;
pub mod pagination;
pub mod password;
pub mod resource;
pub mod room;
pub mod testutil;
pub mod token;
pub mod trip;
pub mod user;
pub mod validation;

pub use audit::{AuditSink, NullAudit};
pub use auth::AuthService;
pub use error::AppError;
pub use pagination::{Cursor, Page, PageRequest, paginate};
pub use resource::{Resource, ResourceService, ResourceStore};
pub use token::{AccessClaims, TokenConfig, TokenService};
pub use user::{Role, User, UserStore};
