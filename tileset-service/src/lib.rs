//! Tileset Service Library
//!
//! HTTP handlers, router and configuration for the terrain elevation
//! service. This library is used by both the tileset-service binary and
//! the integration tests.

pub mod config;
pub mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tileset::TileSet;

pub use config::ServiceConfig;
pub use handlers::{
    BatchRequest, BatchResponse, ElevationQuery, ElevationResponse, ErrorResponse, Location,
    LookupOutcome, StatsResponse, StatusResponse,
};

/// Application state shared across handlers.
pub struct AppState {
    /// Tile set backing all elevation queries.
    pub tiles: TileSet,
}

/// Build the service router.
pub fn router(state: Arc<AppState>, max_post_size: usize) -> Router {
    Router::new()
        .route(
            "/elevation",
            get(handlers::get_elevation).post(handlers::post_elevation),
        )
        .route("/status", get(handlers::get_status))
        .route("/stats", get(handlers::get_stats))
        .layer(DefaultBodyLimit::max(max_post_size))
        .with_state(state)
}
