//! Tile cache with LRU eviction and in-flight load deduplication.
//!
//! Decoded grids are kept in a bounded cache keyed by [`TileKey`]. Loads
//! for the same key coalesce: the first caller performs the backend fetch
//! and decode while later callers wait on the same slot, and all of them
//! observe the identical grid or the identical error. A failed load leaves
//! no cache entry behind, so the next lookup of that key starts a fresh
//! fetch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use moka::future::Cache;
use moka::policy::EvictionPolicy;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::{Result, TileError};
use crate::grid::Grid;
use crate::key::TileKey;
use crate::source::TileSource;

/// Statistics about cache usage.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of tiles currently in the cache.
    pub entry_count: u64,
    /// Number of lookups served from the cache.
    pub hit_count: u64,
    /// Number of lookups that did not find a cached grid.
    pub miss_count: u64,
    /// Number of backend fetches actually performed. With coalescing this
    /// can be much lower than `miss_count`.
    pub load_count: u64,
}

impl CacheStats {
    /// Cache hit rate (0.0 to 1.0). Returns 0.0 before any lookups.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

/// Bounded store of decoded grids with strict LRU eviction.
pub struct TileCache {
    tiles: Cache<TileKey, Arc<Grid>>,
    source: TileSource,
    /// Bounds simultaneous backend fetches across all callers.
    fetch_permits: Semaphore,
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
}

impl TileCache {
    /// Create a cache holding at most `capacity` decoded grids.
    ///
    /// A capacity of zero disables caching: every lookup re-fetches,
    /// though concurrent lookups of one key still share a single fetch
    /// while it is in flight.
    pub fn new(source: TileSource, capacity: u64, max_parallel: usize) -> Self {
        let tiles = Cache::builder()
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self {
            tiles,
            source,
            fetch_permits: Semaphore::new(max_parallel.max(1)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            loads: AtomicU64::new(0),
        }
    }

    /// Returns the decoded grid for `key`, loading it on a miss.
    pub async fn get(&self, key: TileKey) -> Result<Arc<Grid>> {
        if let Some(grid) = self.tiles.get(&key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(grid);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        self.tiles
            .try_get_with(key, self.load(key))
            .await
            .map_err(|e: Arc<TileError>| (*e).clone())
    }

    /// Fetch and decode one tile. Runs at most once per key at a time;
    /// coalesced waiters never reach this method.
    async fn load(&self, key: TileKey) -> Result<Arc<Grid>> {
        self.loads.fetch_add(1, Ordering::Relaxed);

        let _permit = self
            .fetch_permits
            .acquire()
            .await
            .map_err(|_| TileError::Unavailable {
                name: key.tile_name(),
                reason: "tile loader shut down".to_string(),
            })?;

        let bytes = self.source.fetch(&key).await?;
        let grid = Grid::decode(&key, &bytes)?;
        debug!(tile = %key, samples = grid.dim(), "tile decoded");

        Ok(Arc::new(grid))
    }

    /// Whether a grid for `key` is currently cached.
    pub fn contains(&self, key: &TileKey) -> bool {
        self.tiles.contains_key(key)
    }

    /// Flush pending cache maintenance (eviction bookkeeping).
    ///
    /// Entry counts settle lazily; call this before reading them when
    /// exact numbers matter.
    pub async fn run_pending_tasks(&self) {
        self.tiles.run_pending_tasks().await;
    }

    /// Current usage statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.tiles.entry_count(),
            hit_count: self.hits.load(Ordering::Relaxed),
            miss_count: self.misses.load(Ordering::Relaxed),
            load_count: self.loads.load(Ordering::Relaxed),
        }
    }
}
