//! REST API server: routes, JWT authentication, DTOs, and error mapping.

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;
