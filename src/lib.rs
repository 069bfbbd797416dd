//! PVZ Operations API Library
//!
//! Pickup-point (PVZ) operations: moderators register pickup points,
//! employees run a strict receiving workflow (open a reception, add
//! products, remove the last product, close the reception), and a
//! paginated report lists in-progress receptions within a date window.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use std::sync::Arc;

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub config: config::AppConfig,
    pub auth: Arc<auth::AuthService>,
    pub event_sender: events::EventSender,
    pub services: services::AppServices,
}

/// Builds the complete application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(handlers::auth::routes())
        .merge(handlers::pvz::routes())
        .merge(handlers::receptions::routes())
        .merge(handlers::products::routes())
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(openapi::swagger_ui())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
