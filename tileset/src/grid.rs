//! Elevation grid decoding and interpolation.
//!
//! A [`Grid`] is the decoded, owned form of one tile: a square, row-major
//! array of signed 16-bit elevation samples starting at the tile's
//! northwest corner. Grids are immutable after decoding and are shared
//! read-only between all lookups that hit the same tile.

use crate::error::{Result, TileError};
use crate::key::TileKey;

/// Samples per axis for 1 arc-second (~30m) tiles.
const SAMPLES_1ARC: usize = 3601;

/// Samples per axis for 3 arc-second (~90m) tiles.
const SAMPLES_3ARC: usize = 1201;

/// Sample value meaning "elevation unknown at this point".
pub const VOID_VALUE: i16 = -32768;

/// A decoded elevation grid for one tile.
#[derive(Debug)]
pub struct Grid {
    /// Row-major samples, row 0 at the tile's northern edge.
    samples: Vec<i16>,
    /// Samples per axis (1201 or 3601).
    dim: usize,
}

impl Grid {
    /// Decode raw (already decompressed) tile bytes into a grid.
    ///
    /// Samples are big-endian signed 16-bit integers. The grid dimension is
    /// detected from the byte length; anything that is not a 1201² or 3601²
    /// sample square is rejected as corrupt.
    pub fn decode(key: &TileKey, bytes: &[u8]) -> Result<Self> {
        let dim = match bytes.len() {
            n if n == SAMPLES_1ARC * SAMPLES_1ARC * 2 => SAMPLES_1ARC,
            n if n == SAMPLES_3ARC * SAMPLES_3ARC * 2 => SAMPLES_3ARC,
            n => {
                return Err(TileError::Corrupt {
                    name: key.tile_name(),
                    reason: format!("{n} bytes do not form a square grid of 16-bit samples"),
                })
            }
        };

        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
            .collect();

        Ok(Self { samples, dim })
    }

    /// Samples per axis.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Raw sample at a (row, col) index. Row 0 is the northern edge.
    pub fn sample(&self, row: usize, col: usize) -> i16 {
        self.samples[row * self.dim + col]
    }

    /// Bilinear interpolation at a fractional (row, col) position.
    ///
    /// Returns `None` when any sample contributing to the result is the
    /// void sentinel; missing data is never blended into a number.
    /// Positions outside the grid clamp to the nearest edge, and a position
    /// exactly on a sample returns that sample's value unchanged.
    pub fn interpolate(&self, row: f64, col: f64) -> Option<f64> {
        let max = (self.dim - 1) as f64;
        let row = row.clamp(0.0, max);
        let col = col.clamp(0.0, max);

        let r0 = row.floor() as usize;
        let c0 = col.floor() as usize;
        let dr = row - r0 as f64;
        let dc = col - c0 as f64;

        // A zero fraction on an axis means the second row/column carries no
        // weight; collapsing the index keeps void samples there from
        // poisoning an exact-position lookup.
        let r1 = if dr > 0.0 { r0 + 1 } else { r0 };
        let c1 = if dc > 0.0 { c0 + 1 } else { c0 };

        let nw = self.sample(r0, c0);
        let ne = self.sample(r0, c1);
        let sw = self.sample(r1, c0);
        let se = self.sample(r1, c1);

        if nw == VOID_VALUE || ne == VOID_VALUE || sw == VOID_VALUE || se == VOID_VALUE {
            return None;
        }

        let north = f64::from(nw) * (1.0 - dc) + f64::from(ne) * dc;
        let south = f64::from(sw) * (1.0 - dc) + f64::from(se) * dc;

        Some(north * (1.0 - dr) + south * dr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: TileKey = TileKey { lat: 46, lon: 6 };

    /// Build raw tile bytes for a 1201² grid filled with `fill`, then
    /// patched with the given (row, col, value) samples.
    fn tile_bytes(fill: i16, patches: &[(usize, usize, i16)]) -> Vec<u8> {
        let mut samples = vec![fill; SAMPLES_3ARC * SAMPLES_3ARC];
        for &(row, col, value) in patches {
            samples[row * SAMPLES_3ARC + col] = value;
        }
        samples.iter().flat_map(|s| s.to_be_bytes()).collect()
    }

    #[test]
    fn test_decode_roundtrip() {
        let bytes = tile_bytes(0, &[(0, 0, 1000), (600, 600, 500), (1200, 1200, 100)]);
        let grid = Grid::decode(&KEY, &bytes).unwrap();

        assert_eq!(grid.dim(), SAMPLES_3ARC);
        assert_eq!(grid.sample(0, 0), 1000);
        assert_eq!(grid.sample(600, 600), 500);
        assert_eq!(grid.sample(1200, 1200), 100);
        assert_eq!(grid.sample(1, 1), 0);
    }

    #[test]
    fn test_decode_negative_samples() {
        // Dead Sea style depressions are legitimate negative elevations.
        let bytes = tile_bytes(-430, &[]);
        let grid = Grid::decode(&KEY, &bytes).unwrap();
        assert_eq!(grid.sample(600, 600), -430);
    }

    #[test]
    fn test_decode_invalid_length() {
        let result = Grid::decode(&KEY, &[0u8; 1000]);
        match result {
            Err(TileError::Corrupt { name, .. }) => assert_eq!(name, "N46E006"),
            other => panic!("expected Corrupt error, got {other:?}"),
        }
    }

    #[test]
    fn test_interpolate_exact_sample() {
        let bytes = tile_bytes(0, &[(600, 600, 500)]);
        let grid = Grid::decode(&KEY, &bytes).unwrap();

        // No blending at an exact grid position.
        assert_eq!(grid.interpolate(600.0, 600.0), Some(500.0));
    }

    #[test]
    fn test_interpolate_uniform_grid() {
        let bytes = tile_bytes(400, &[]);
        let grid = Grid::decode(&KEY, &bytes).unwrap();

        for (row, col) in [(0.0, 0.0), (600.5, 600.5), (1200.0, 1200.0), (3.25, 997.75)] {
            assert_eq!(grid.interpolate(row, col), Some(400.0));
        }
    }

    #[test]
    fn test_interpolate_blends_neighbors() {
        let bytes = tile_bytes(
            0,
            &[(10, 10, 100), (10, 11, 200), (11, 10, 300), (11, 11, 400)],
        );
        let grid = Grid::decode(&KEY, &bytes).unwrap();

        // Center of the four samples averages them.
        assert_eq!(grid.interpolate(10.5, 10.5), Some(250.0));
        // Halfway along the northern edge of the cell.
        assert_eq!(grid.interpolate(10.0, 10.5), Some(150.0));
    }

    #[test]
    fn test_interpolate_void_neighbor() {
        let bytes = tile_bytes(
            400,
            &[(10, 10, 100), (10, 11, VOID_VALUE), (11, 10, 300), (11, 11, 400)],
        );
        let grid = Grid::decode(&KEY, &bytes).unwrap();

        // Any void among the contributing samples means no data.
        assert_eq!(grid.interpolate(10.5, 10.5), None);
    }

    #[test]
    fn test_interpolate_exact_void_sample() {
        let bytes = tile_bytes(400, &[(600, 600, VOID_VALUE)]);
        let grid = Grid::decode(&KEY, &bytes).unwrap();

        assert_eq!(grid.interpolate(600.0, 600.0), None);
        // A neighboring cell not touching the void sample is unaffected.
        assert_eq!(grid.interpolate(598.5, 598.5), Some(400.0));
    }

    #[test]
    fn test_interpolate_clamps_at_boundary() {
        let bytes = tile_bytes(0, &[(1200, 1200, 100)]);
        let grid = Grid::decode(&KEY, &bytes).unwrap();

        // The last row/column uses the nearest valid cell, no extrapolation.
        assert_eq!(grid.interpolate(1200.0, 1200.0), Some(100.0));
        assert_eq!(grid.interpolate(1300.0, 1300.0), Some(100.0));
        assert_eq!(grid.interpolate(-5.0, -5.0), grid.interpolate(0.0, 0.0));
    }
}
