//! # XBS PUDO Gateway Library
//!
//! Exposes the Axum router and modules so integration tests can create
//! an in-process server without requiring `cargo run` in another terminal.

pub mod classifier;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod shipment;
pub mod shopify;
pub mod xbs;

use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::shopify::ShopifyClient;
use crate::xbs::XbsClient;

/// Shared per-request context: configuration plus the two upstream clients.
/// No mutable state lives here; every request builds its own shipment.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub xbs: XbsClient,
    pub shopify: ShopifyClient,
}

/// Build the Axum router with all route modules and middleware.
///
/// This function does NOT start a server; the caller binds and serves.
pub fn create_app(config: AppConfig) -> Router {
    let state = AppState {
        xbs: XbsClient::new(&config.xbs),
        shopify: ShopifyClient::new(&config.shopify),
        config: config.into_shared(),
    };

    Router::new()
        .route("/health", get(health))
        .merge(routes::locations::router())
        .merge(routes::shipments::router())
        .merge(routes::webhooks::router())
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
