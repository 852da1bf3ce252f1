use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use travlr_core::{TokenConfig, TokenService};
use travlr_db::{Database, DatabaseConfig};
use travlr_server::config::ServerConfig;
use travlr_server::routes;
use travlr_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("travlr=info".parse()?))
        .with_target(false)
        .init();

    let config = ServerConfig::from_env()?;
    let tokens = TokenService::new(&TokenConfig::from_env()?);
    let addr = format!("0.0.0.0:{}", config.port);

    let db = Database::connect(&DatabaseConfig::from_env()?).await?;
    db.migrate().await?;

    if config.is_development() {
        tracing::warn!("Running in development mode: internal errors are exposed");
    }

    let state = Arc::new(AppState::new(db, tokens, config));
    let app = routes::app(state);

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    tracing::info!("Shutdown signal received");
}
