//! Tile sources.
//!
//! A tile source resolves a [`TileKey`] to raw grid bytes. Two backends
//! exist: a local tile directory and an HTTPS object-storage bucket. Both
//! use the same [`TileKey::object_path`] naming convention, so a directory
//! tree and a bucket mirror each other and can be swapped by configuration
//! alone.

use std::io::{ErrorKind, Read};
use std::path::PathBuf;
use std::time::Duration;

use flate2::read::GzDecoder;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{Result, TileError};
use crate::key::TileKey;

/// Default timeout for object-storage requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of retry attempts after a transient failure.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay between retry attempts (grows linearly).
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Which backend serves tile bytes.
///
/// Selected once at construction; never inferred from the shape of a path
/// string.
#[derive(Debug, Clone)]
pub enum Backend {
    /// Read tiles from a local directory laid out as `<band>/<name>.hgt`
    /// or `<band>/<name>.hgt.gz`.
    Filesystem(PathBuf),
    /// Fetch gzipped tiles from an HTTPS bucket.
    ObjectStorage(ObjectStorageConfig),
}

/// Configuration for the object-storage backend.
#[derive(Debug, Clone)]
pub struct ObjectStorageConfig {
    /// Base URL of the bucket, e.g.
    /// "https://elevation-tiles-prod.s3.amazonaws.com/skadi".
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry attempts after a transient failure.
    pub max_retries: u32,
    /// Base delay between attempts; attempt `n` waits `n * backoff`.
    pub retry_backoff: Duration,
}

impl ObjectStorageConfig {
    /// Create a configuration for the given bucket endpoint with default
    /// timeout and retry settings.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retry attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the base delay between retry attempts.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }
}

/// A configured tile backend.
///
/// The single capability both variants expose is [`TileSource::fetch`]:
/// resolve a key to decompressed grid bytes.
pub enum TileSource {
    File(FileSource),
    Object(ObjectSource),
}

impl TileSource {
    /// Build the source selected by `backend`.
    pub fn new(backend: Backend) -> Result<Self> {
        match backend {
            Backend::Filesystem(dir) => Ok(Self::File(FileSource { dir })),
            Backend::ObjectStorage(config) => Ok(Self::Object(ObjectSource::new(config)?)),
        }
    }

    /// Fetch the raw (decompressed) grid bytes for a tile.
    pub async fn fetch(&self, key: &TileKey) -> Result<Vec<u8>> {
        match self {
            Self::File(source) => source.fetch(key).await,
            Self::Object(source) => source.fetch(key).await,
        }
    }
}

/// Reads tiles from a local directory.
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    async fn fetch(&self, key: &TileKey) -> Result<Vec<u8>> {
        let name = key.tile_name();
        let band_dir = self.dir.join(key.band());

        let plain = band_dir.join(format!("{name}.hgt"));
        match tokio::fs::read(&plain).await {
            Ok(bytes) => {
                debug!(tile = %name, path = %plain.display(), "loaded tile from disk");
                return Ok(bytes);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(TileError::Unavailable {
                    name,
                    reason: e.to_string(),
                })
            }
        }

        let gz = band_dir.join(format!("{name}.hgt.gz"));
        match tokio::fs::read(&gz).await {
            Ok(bytes) => {
                debug!(tile = %name, path = %gz.display(), "loaded gzipped tile from disk");
                gunzip(&bytes, &name)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(TileError::NotFound { name }),
            Err(e) => Err(TileError::Unavailable {
                name,
                reason: e.to_string(),
            }),
        }
    }
}

/// Fetches gzipped tiles from an HTTPS bucket.
pub struct ObjectSource {
    client: reqwest::Client,
    config: ObjectStorageConfig,
}

impl ObjectSource {
    fn new(config: ObjectStorageConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TileError::Unavailable {
                name: String::new(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self { client, config })
    }

    fn tile_url(&self, key: &TileKey) -> String {
        format!(
            "{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            key.object_path()
        )
    }

    /// Fetch with bounded retries.
    ///
    /// Only transient failures (connect errors, timeouts, non-2xx
    /// responses other than 404) are retried; a missing tile or a corrupt
    /// body is returned immediately.
    async fn fetch(&self, key: &TileKey) -> Result<Vec<u8>> {
        let name = key.tile_name();
        let url = self.tile_url(key);

        let mut last_error = None;
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_backoff * attempt).await;
                debug!(tile = %name, attempt, "retrying tile fetch");
            }

            match self.fetch_once(&name, &url).await {
                Ok(bytes) => return Ok(bytes),
                Err(e @ TileError::Unavailable { .. }) => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| TileError::Unavailable {
            name,
            reason: "retries exhausted".to_string(),
        }))
    }

    async fn fetch_once(&self, name: &str, url: &str) -> Result<Vec<u8>> {
        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| TileError::Unavailable {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TileError::NotFound {
                name: name.to_string(),
            });
        }
        if !status.is_success() {
            return Err(TileError::Unavailable {
                name: name.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let body = response.bytes().await.map_err(|e| TileError::Unavailable {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        debug!(tile = %name, bytes = body.len(), "fetched tile from object storage");
        gunzip(&body, name)
    }
}

/// Decompress a gzipped tile body.
fn gunzip(bytes: &[u8], name: &str) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut data = Vec::new();
    decoder
        .read_to_end(&mut data)
        .map_err(|e| TileError::Corrupt {
            name: name.to_string(),
            reason: format!("gzip decompression failed: {e}"),
        })?;
    Ok(data)
}
