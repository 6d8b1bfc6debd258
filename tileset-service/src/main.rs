//! Tileset Service - HTTP microservice for terrain elevation queries.
//!
//! Maps coordinates to 1° × 1° terrain tiles, loads elevation grids from a
//! local directory or an object-storage bucket, and answers elevation
//! queries by bilinear interpolation.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TILE_SET_BACKEND` | `file` or `s3` | `file` |
//! | `TILE_SET_PATH` | Tile directory for the `file` backend | `./data` |
//! | `TILE_SET_BUCKET` | Bucket endpoint URL for the `s3` backend | AWS terrain tiles |
//! | `TILE_SET_CACHE` | Maximum tiles in cache | 128 |
//! | `TILE_SET_MAX_PARALLEL` | Maximum simultaneous tile loads | 500 |
//! | `MAX_POST_SIZE` | POST body limit in bytes | 512000 |
//! | `PORT` | HTTP server port | 3000 |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /elevation?lat=X&lng=Y` - Elevation at a coordinate
//! - `POST /elevation` - Batch elevation query over a list of locations
//! - `GET /status` - Liveness check
//! - `GET /stats` - Cache statistics
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use tileset::TileSet;
use tileset_service::{handlers, AppState, ServiceConfig};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation for the elevation service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tileset Elevation Service",
        version = "0.1.0",
        description = "Terrain elevation lookups over cached 1° × 1° tiles.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::get_elevation,
        handlers::post_elevation,
        handlers::get_status,
        handlers::get_stats,
    ),
    components(
        schemas(
            handlers::ElevationResponse,
            handlers::Location,
            handlers::BatchRequest,
            handlers::LookupOutcome,
            handlers::BatchResponse,
            handlers::ErrorResponse,
            handlers::StatusResponse,
            handlers::StatsResponse,
        )
    ),
    tags(
        (name = "elevation", description = "Elevation query endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tileset_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env()?;

    tracing::info!(
        backend = ?config.tile_set.backend,
        cache_size = config.tile_set.cache_size,
        max_parallel = config.tile_set.max_parallel,
        port = config.port,
        "starting elevation service"
    );

    let tiles = TileSet::new(config.tile_set.clone())?;
    let state = Arc::new(AppState { tiles });

    let app = tileset_service::router(state, config.max_post_size)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
