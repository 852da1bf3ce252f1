use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use tower::ServiceExt;

use travlr_core::{TokenConfig, TokenService};
use travlr_db::Database;
use travlr_server::config::ServerConfig;
use travlr_server::routes;
use travlr_server::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const ADMIN_PASSWORD: &str = "Admin@123";
pub const USER_PASSWORD: &str = "User@123";

/// Test app handle. Dropping it stops the container.
pub struct TestApp {
    pub router: Router,
    pub db: Database,
    _container: ContainerAsync<GenericImage>,
}

/// Spin up a PostgreSQL container and return the full app stack over it.
pub async fn setup_test_app() -> TestApp {
    let container = GenericImage::new("postgres", "16")
        .with_exposed_port(ContainerPort::Tcp(5432))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_PASSWORD", "postgres")
        .with_env_var("POSTGRES_DB", "travlr_test")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");

    let url = format!("postgresql://postgres:postgres@{host}:{port}/travlr_test");
    let pool = retry_connect(&url).await;

    let db = Database::from_pool(pool);
    db.migrate().await.expect("Failed to run migrations");

    let state = Arc::new(AppState::new(
        db.clone(),
        TokenService::new(&TokenConfig::new(TEST_SECRET)),
        ServerConfig::default(),
    ));

    TestApp {
        router: routes::app(state),
        db,
        _container: container,
    }
}

async fn retry_connect(url: &str) -> PgPool {
    for _ in 0..30 {
        if let Ok(pool) = PgPoolOptions::new().max_connections(5).connect(url).await {
            return pool;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    panic!("Failed to connect to test database");
}

impl TestApp {
    /// Send a request and decode the JSON body (`Null` when there is none).
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    /// Register an account through the API and return its access token.
    pub async fn register(&self, email: &str, password: &str, role: &str) -> String {
        let (status, json) = self
            .call(
                "POST",
                "/api/v1/auth/register",
                None,
                Some(serde_json::json!({
                    "name": "Test Account",
                    "email": email,
                    "password": password,
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.register("admin@travlr.com", ADMIN_PASSWORD, "admin")
            .await
    }

    pub async fn user_token(&self) -> String {
        self.register("user@travlr.com", USER_PASSWORD, "user").await
    }
}

pub fn trip_body(code: &str) -> serde_json::Value {
    let start = chrono::Utc::now() + chrono::Duration::days(30);
    serde_json::json!({
        "code": code,
        "name": "Gale Reef",
        "length": "4 nights / 5 days",
        "start": start,
        "resort": "Emerald Bay, 3 stars",
        "perPerson": "799.00",
        "image": "reef1.jpg",
        "description": "Sed et augue lorem. In sit amet placerat arcu.",
    })
}
