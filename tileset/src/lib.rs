//! # Tileset — terrain tile elevation lookups
//!
//! Answers "what is the ground elevation at latitude/longitude X?" by
//! mapping the coordinate to a 1° × 1° terrain tile, loading that tile's
//! binary elevation grid from a local directory or an HTTPS bucket, and
//! bilinearly interpolating a height from the surrounding samples.
//!
//! Decoded grids are held in a bounded LRU cache; concurrent lookups of an
//! uncached tile share a single backend fetch, and a process-wide limit
//! bounds how many fetches run at once.
//!
//! ## Quick start
//!
//! ```ignore
//! use tileset::{Backend, TileSet, TileSetConfig};
//!
//! let tiles = TileSet::new(TileSetConfig::new(Backend::Filesystem("/data/tiles".into()))
//!     .cache_size(128))?;
//!
//! // Matterhorn region
//! if let Some(elevation) = tiles.get_elevation(45.9766, 7.6585).await? {
//!     println!("{elevation:.1} m");
//! }
//! ```
//!
//! ## Tile format
//!
//! A tile is a square grid of big-endian signed 16-bit samples, row-major
//! from the tile's northwest corner, 3601² (1 arc-second) or 1201²
//! (3 arc-second) samples per tile, optionally gzip-compressed. The value
//! -32768 marks a point with no elevation data.

pub mod cache;
pub mod error;
pub mod grid;
pub mod key;
pub mod source;

pub use cache::CacheStats;
pub use error::{Result, TileError};
pub use grid::{Grid, VOID_VALUE};
pub use key::TileKey;
pub use source::{Backend, ObjectStorageConfig};

use futures::stream::{self, StreamExt};

use crate::cache::TileCache;
use crate::source::TileSource;

/// Default number of decoded tiles kept in memory.
pub const DEFAULT_CACHE_SIZE: u64 = 128;

/// Default bound on simultaneous in-flight tile lookups.
pub const DEFAULT_MAX_PARALLEL: usize = 500;

/// Construction-time configuration for a [`TileSet`].
#[derive(Debug, Clone)]
pub struct TileSetConfig {
    /// Where tile bytes come from.
    pub backend: Backend,
    /// Maximum number of decoded grids kept in memory (0 = no caching).
    pub cache_size: u64,
    /// Maximum simultaneous in-flight tile loads.
    pub max_parallel: usize,
}

impl TileSetConfig {
    /// Configuration for the given backend with default cache size and
    /// parallelism.
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            cache_size: DEFAULT_CACHE_SIZE,
            max_parallel: DEFAULT_MAX_PARALLEL,
        }
    }

    /// Set the cache capacity in tiles.
    pub fn cache_size(mut self, cache_size: u64) -> Self {
        self.cache_size = cache_size;
        self
    }

    /// Set the bound on simultaneous in-flight tile loads.
    pub fn max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel;
        self
    }
}

/// Elevation lookup service over a cached tile backend.
///
/// One `TileSet` owns the cache and the backend; construct it once at
/// startup and share it behind an `Arc`.
pub struct TileSet {
    cache: TileCache,
    max_parallel: usize,
}

impl TileSet {
    /// Build a tile set from configuration.
    ///
    /// # Errors
    ///
    /// Fails when the object-storage HTTP client cannot be constructed.
    pub fn new(config: TileSetConfig) -> Result<Self> {
        let source = TileSource::new(config.backend)?;
        let max_parallel = config.max_parallel.max(1);

        Ok(Self {
            cache: TileCache::new(source, config.cache_size, max_parallel),
            max_parallel,
        })
    }

    /// Interpolated elevation in meters at a coordinate.
    ///
    /// Returns `Ok(None)` where no answer exists — the coordinate's tile is
    /// not part of the data set, or the surrounding samples are void. An
    /// `Err` means the backend failed to serve a tile that may exist.
    pub async fn get_elevation(&self, lat: f64, lng: f64) -> Result<Option<f64>> {
        let key = TileKey::for_coord(lat, lng);

        let grid = match self.cache.get(key).await {
            Ok(grid) => grid,
            Err(TileError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let (row, col) = key.local_offset(lat, lng, grid.dim());
        Ok(grid.interpolate(row, col))
    }

    /// Elevations for a batch of coordinates.
    ///
    /// Results are in input order and each coordinate carries its own
    /// outcome, so one failing tile cannot abort the rest of the batch.
    /// At most `max_parallel` lookups are driven at once.
    pub async fn get_elevations(&self, coords: &[(f64, f64)]) -> Vec<Result<Option<f64>>> {
        stream::iter(coords.iter().copied())
            .map(|(lat, lng)| self.get_elevation(lat, lng))
            .buffered(self.max_parallel)
            .collect()
            .await
    }

    /// Current cache usage statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
