//! HTTP request handlers for the elevation service.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::AppState;

/// Query parameters for the single elevation endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ElevationQuery {
    /// Latitude in decimal degrees (-90 to 90).
    pub lat: f64,
    /// Longitude in decimal degrees (-180 to 180).
    pub lng: f64,
}

/// Successful elevation response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ElevationResponse {
    /// Interpolated elevation in meters, or null where no data exists.
    pub elevation: Option<f64>,
    /// Latitude queried.
    pub lat: f64,
    /// Longitude queried.
    pub lng: f64,
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// One coordinate in a batch request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct Location {
    /// Latitude in decimal degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180).
    pub longitude: f64,
}

/// Batch elevation request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchRequest {
    /// Coordinates to look up, answered in this order.
    pub locations: Vec<Location>,
}

/// Outcome for one coordinate of a batch lookup.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum LookupOutcome {
    /// Interpolated elevation in meters, or null where no data exists.
    Elevation(Option<f64>),
    /// The tile source failed for this coordinate.
    Failed {
        /// Why the lookup failed.
        error: String,
    },
}

/// Batch elevation response.
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchResponse {
    /// One outcome per requested coordinate, in request order.
    pub results: Vec<LookupOutcome>,
}

/// Liveness response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Cache statistics response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Number of tiles in cache.
    pub cached_tiles: u64,
    /// Cache hit count.
    pub cache_hits: u64,
    /// Cache miss count.
    pub cache_misses: u64,
    /// Number of backend tile loads performed.
    pub tile_loads: u64,
    /// Cache hit rate (0.0 to 1.0).
    pub hit_rate: f64,
}

/// Reject non-finite or out-of-range coordinates before they reach the
/// tile set.
fn validate_coordinate(lat: f64, lng: f64) -> Result<(), String> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(format!(
            "Invalid latitude {lat}. Expected a finite number between -90 and 90"
        ));
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(format!(
            "Invalid longitude {lng}. Expected a finite number between -180 and 180"
        ));
    }
    Ok(())
}

/// Get elevation for given coordinates.
#[utoipa::path(
    get,
    path = "/elevation",
    params(ElevationQuery),
    responses(
        (status = 200, description = "Elevation at the coordinate; null where no data exists", body = ElevationResponse),
        (status = 400, description = "Invalid coordinates", body = ErrorResponse),
        (status = 500, description = "Tile source failure", body = ErrorResponse),
    ),
    tag = "elevation"
)]
pub async fn get_elevation(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ElevationQuery>,
) -> impl IntoResponse {
    if let Err(message) = validate_coordinate(query.lat, query.lng) {
        return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message })).into_response();
    }

    match state.tiles.get_elevation(query.lat, query.lng).await {
        Ok(elevation) => {
            tracing::debug!(
                lat = query.lat,
                lng = query.lng,
                elevation = ?elevation,
                "elevation query"
            );
            (
                StatusCode::OK,
                Json(ElevationResponse {
                    elevation,
                    lat: query.lat,
                    lng: query.lng,
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(lat = query.lat, lng = query.lng, error = %e, "elevation query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Get elevations for a batch of coordinates.
#[utoipa::path(
    post,
    path = "/elevation",
    request_body = BatchRequest,
    responses(
        (status = 200, description = "One outcome per coordinate, in request order", body = BatchResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
    ),
    tag = "elevation"
)]
pub async fn post_elevation(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BatchRequest>,
) -> impl IntoResponse {
    for location in &payload.locations {
        if let Err(message) = validate_coordinate(location.latitude, location.longitude) {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message }))
                .into_response();
        }
    }

    let coords: Vec<(f64, f64)> = payload
        .locations
        .iter()
        .map(|l| (l.latitude, l.longitude))
        .collect();

    let results = state
        .tiles
        .get_elevations(&coords)
        .await
        .into_iter()
        .map(|result| match result {
            Ok(elevation) => LookupOutcome::Elevation(elevation),
            Err(e) => LookupOutcome::Failed {
                error: e.to_string(),
            },
        })
        .collect();

    tracing::debug!(locations = coords.len(), "batch elevation query");
    (StatusCode::OK, Json(BatchResponse { results })).into_response()
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/status",
    responses((status = 200, description = "Service is up", body = StatusResponse)),
    tag = "system"
)]
pub async fn get_status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Tile cache statistics.
#[utoipa::path(
    get,
    path = "/stats",
    responses((status = 200, description = "Cache statistics", body = StatsResponse)),
    tag = "system"
)]
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let stats = state.tiles.cache_stats();

    Json(StatsResponse {
        cached_tiles: stats.entry_count,
        cache_hits: stats.hit_count,
        cache_misses: stats.miss_count,
        tile_loads: stats.load_count,
        hit_rate: stats.hit_rate(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_request_deserialize() {
        let json = r#"{"locations": [{"latitude": 46.5, "longitude": 6.5}]}"#;
        let request: BatchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.locations.len(), 1);
        assert_eq!(request.locations[0].latitude, 46.5);
        assert_eq!(request.locations[0].longitude, 6.5);
    }

    #[test]
    fn test_lookup_outcome_serialize() {
        let json = serde_json::to_string(&LookupOutcome::Elevation(Some(400.0))).unwrap();
        assert_eq!(json, "400.0");

        let json = serde_json::to_string(&LookupOutcome::Elevation(None)).unwrap();
        assert_eq!(json, "null");

        let json = serde_json::to_string(&LookupOutcome::Failed {
            error: "tile source unavailable".to_string(),
        })
        .unwrap();
        assert!(json.contains("tile source unavailable"));
    }

    #[test]
    fn test_elevation_response_serialize() {
        let response = ElevationResponse {
            elevation: Some(400.0),
            lat: 46.5,
            lng: 6.5,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("400"));
        assert!(json.contains("46.5"));

        let response = ElevationResponse {
            elevation: None,
            lat: 0.0,
            lng: 0.0,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"elevation\":null"));
    }

    #[test]
    fn test_validate_coordinate() {
        assert!(validate_coordinate(46.5, 6.5).is_ok());
        assert!(validate_coordinate(-90.0, 180.0).is_ok());

        assert!(validate_coordinate(91.0, 0.0).is_err());
        assert!(validate_coordinate(0.0, -181.0).is_err());
        assert!(validate_coordinate(f64::NAN, 0.0).is_err());
        assert!(validate_coordinate(0.0, f64::INFINITY).is_err());
    }
}
