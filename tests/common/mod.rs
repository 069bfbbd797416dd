#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use pvz_api::{
    auth::{AuthConfig, AuthService, Role},
    config::AppConfig,
    events::{self, EventSender},
    migrator::Migrator,
    services::AppServices,
    AppState,
};

/// Helper harness for spinning up application state backed by SQLite.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    _db_dir: Option<tempfile::TempDir>,
}

impl TestApp {
    /// In-memory SQLite on a single connection. Suitable for everything
    /// except genuine cross-connection concurrency.
    pub async fn new() -> Self {
        Self::with_database("sqlite::memory:".to_string(), 1, None).await
    }

    /// File-backed SQLite with a small pool, for tests that race real
    /// concurrent connections against each other.
    pub async fn new_with_pool() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("pvz_test.db").display()
        );
        Self::with_database(url, 5, Some(dir)).await
    }

    async fn with_database(
        url: String,
        max_connections: u32,
        dir: Option<tempfile::TempDir>,
    ) -> Self {
        let mut opt = ConnectOptions::new(url.clone());
        opt.max_connections(max_connections)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(opt).await.expect("db connect");
        Migrator::up(&db, None).await.expect("migrations");

        let db = Arc::new(db);
        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        tokio::spawn(events::process_events(event_rx));

        let cfg = AppConfig::new(
            url,
            "test_secret_key_for_testing_purposes_only",
            3600,
            "127.0.0.1",
            18080,
        );
        let auth = Arc::new(AuthService::new(
            AuthConfig::new(cfg.jwt_secret.clone(), Duration::from_secs(cfg.jwt_expiration)),
            db.clone(),
        ));
        let services = AppServices::new(db.clone(), event_sender.clone());
        let state = AppState {
            db,
            config: cfg,
            auth,
            event_sender,
            services,
        };
        let router = pvz_api::app(state.clone());

        Self {
            state,
            router,
            _db_dir: dir,
        }
    }

    /// Issue a token via the dummy-login path.
    pub async fn token_for(&self, role: Role) -> String {
        self.state
            .auth
            .dummy_login(role)
            .await
            .expect("dummy login")
            .access_token
    }

    /// Fire one request at the router and decode the JSON body (Null when
    /// the body is empty).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }
}
