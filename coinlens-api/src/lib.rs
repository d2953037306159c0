//! coinlens-api library - coin identification service
//!
//! Exposes the router and its collaborators for the binary and for
//! integration testing.

pub mod api;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::services::{CoinRecognizer, ImageStore};

/// Mount point for stored coin images
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Application state shared across HTTP handlers
///
/// Every collaborator is built once in `main` and handed in here.
#[derive(Clone)]
pub struct AppState {
    /// Record store connection pool
    pub db: SqlitePool,
    /// Recognition service client
    pub recognizer: Arc<dyn CoinRecognizer>,
    /// Image file storage
    pub images: ImageStore,
}

impl AppState {
    pub fn new(db: SqlitePool, recognizer: Arc<dyn CoinRecognizer>, images: ImageStore) -> Self {
        Self {
            db,
            recognizer,
            images,
        }
    }
}

/// Build application router
///
/// Coin API routes, health check, read-only image serving, and request logging
/// around all of them.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;

    let uploads = ServeDir::new(state.images.root());

    Router::new()
        .merge(api::coin_routes())
        .merge(api::health_routes())
        .nest_service(UPLOADS_ROUTE, uploads)
        .layer(middleware::from_fn(api::log_requests))
        .with_state(state)
}
