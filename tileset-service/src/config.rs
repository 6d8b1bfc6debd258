//! Environment-driven service configuration.
//!
//! The backend is selected by an explicit `TILE_SET_BACKEND` value; a tile
//! path is never inspected to guess whether it names a bucket.

use std::path::PathBuf;

use tileset::{Backend, ObjectStorageConfig, TileSetConfig};

/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default POST body limit in bytes.
pub const DEFAULT_MAX_POST_SIZE: usize = 512_000;

/// Default bucket endpoint for the `s3` backend (AWS terrain tiles).
const DEFAULT_BUCKET: &str = "https://elevation-tiles-prod.s3.amazonaws.com/skadi";

/// Default tile directory for the `file` backend.
const DEFAULT_TILE_DIR: &str = "./data";

/// Runtime configuration for the service process.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Maximum accepted POST body size in bytes.
    pub max_post_size: usize,
    /// Configuration handed to the tile set.
    pub tile_set: TileSetConfig,
}

impl ServiceConfig {
    /// Read configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `TILE_SET_BACKEND` | `file` or `s3` | `file` |
    /// | `TILE_SET_PATH` | Tile directory for the `file` backend | `./data` |
    /// | `TILE_SET_BUCKET` | Bucket endpoint URL for the `s3` backend | AWS terrain tiles |
    /// | `TILE_SET_CACHE` | Maximum tiles in cache | 128 |
    /// | `TILE_SET_MAX_PARALLEL` | Maximum simultaneous tile loads | 500 |
    /// | `MAX_POST_SIZE` | POST body limit in bytes | 512000 |
    /// | `PORT` | HTTP listen port | 3000 |
    ///
    /// # Errors
    ///
    /// Returns an error when `TILE_SET_BACKEND` names an unknown backend.
    pub fn from_env() -> Result<Self, String> {
        let backend = match std::env::var("TILE_SET_BACKEND").as_deref() {
            Err(_) | Ok("file") => {
                let dir = std::env::var("TILE_SET_PATH")
                    .unwrap_or_else(|_| DEFAULT_TILE_DIR.to_string());
                Backend::Filesystem(PathBuf::from(dir))
            }
            Ok("s3") => {
                let bucket = std::env::var("TILE_SET_BUCKET")
                    .unwrap_or_else(|_| DEFAULT_BUCKET.to_string());
                Backend::ObjectStorage(ObjectStorageConfig::new(bucket))
            }
            Ok(other) => {
                return Err(format!(
                    "unknown TILE_SET_BACKEND {other:?}, expected \"file\" or \"s3\""
                ))
            }
        };

        let cache_size: u64 = std::env::var("TILE_SET_CACHE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(tileset::DEFAULT_CACHE_SIZE);

        let max_parallel: usize = std::env::var("TILE_SET_MAX_PARALLEL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(tileset::DEFAULT_MAX_PARALLEL);

        let max_post_size: usize = std::env::var("MAX_POST_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_POST_SIZE);

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            port,
            max_post_size,
            tile_set: TileSetConfig::new(backend)
                .cache_size(cache_size)
                .max_parallel(max_parallel),
        })
    }
}
