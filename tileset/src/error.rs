//! Error types for the tileset library.

use thiserror::Error;

/// Errors that can occur while resolving a tile.
///
/// The type is `Clone` so the outcome of a single failed load can be handed
/// unchanged to every caller waiting on the same in-flight tile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TileError {
    /// No tile exists for the requested key.
    ///
    /// This is how coverage gaps (oceans, polar caps) surface; callers
    /// report it as "no data" rather than as a failure.
    #[error("tile {name} not found")]
    NotFound {
        /// Tile name, e.g. "N46E006".
        name: String,
    },

    /// The tile bytes could not be decoded into an elevation grid.
    #[error("corrupt tile {name}: {reason}")]
    Corrupt {
        /// Tile name, e.g. "N46E006".
        name: String,
        /// What went wrong while decoding.
        reason: String,
    },

    /// The backend could not serve the tile (network or disk failure).
    #[error("tile source unavailable for {name}: {reason}")]
    Unavailable {
        /// Tile name, e.g. "N46E006".
        name: String,
        /// The underlying transport failure.
        reason: String,
    },
}

/// Result type alias using [`TileError`].
pub type Result<T> = std::result::Result<T, TileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TileError::NotFound {
            name: "N46E006".to_string(),
        };
        assert!(err.to_string().contains("N46E006"));

        let err = TileError::Corrupt {
            name: "N46E006".to_string(),
            reason: "short read".to_string(),
        };
        assert!(err.to_string().contains("short read"));

        let err = TileError::Unavailable {
            name: "N46E006".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_error_is_cloneable() {
        let err = TileError::Unavailable {
            name: "N00E000".to_string(),
            reason: "timeout".to_string(),
        };
        assert_eq!(err.clone(), err);
    }
}
