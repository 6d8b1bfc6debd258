//! Tile addressing.
//!
//! A [`TileKey`] names the 1° × 1° tile containing a coordinate by the
//! integer degrees of its southwest corner. Keys derive deterministically
//! from coordinates with floor semantics on both axes, so a point exactly on
//! a tile boundary belongs to the tile whose origin is at or below it.
//!
//! # Naming convention
//!
//! Tiles are named `{N|S}{lat:02}{E|W}{lon:03}` after their southwest
//! corner (e.g. `N46E006`, `S13W078`) and stored under a latitude-band
//! directory, so both backends resolve the same relative path:
//! `N46/N46E006.hgt.gz`.

use std::fmt;

/// Identifies a 1° × 1° terrain tile by its southwest corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    /// Southwest corner latitude in whole degrees.
    pub lat: i32,
    /// Southwest corner longitude in whole degrees.
    pub lon: i32,
}

impl TileKey {
    /// Returns the key of the tile containing the given coordinate.
    ///
    /// Pure and total over the valid coordinate ranges; equal coordinates
    /// within one tile always produce the same key.
    pub fn for_coord(lat: f64, lon: f64) -> Self {
        Self {
            lat: lat.floor() as i32,
            lon: lon.floor() as i32,
        }
    }

    /// Returns the tile name, e.g. "N46E006".
    pub fn tile_name(&self) -> String {
        let lat_prefix = if self.lat >= 0 { 'N' } else { 'S' };
        let lon_prefix = if self.lon >= 0 { 'E' } else { 'W' };

        format!(
            "{}{:02}{}{:03}",
            lat_prefix,
            self.lat.abs(),
            lon_prefix,
            self.lon.abs()
        )
    }

    /// Returns the latitude-band directory name, e.g. "N46".
    pub fn band(&self) -> String {
        let lat_prefix = if self.lat >= 0 { 'N' } else { 'S' };
        format!("{}{:02}", lat_prefix, self.lat.abs())
    }

    /// Returns the relative path used by both backends, e.g.
    /// "N46/N46E006.hgt.gz".
    pub fn object_path(&self) -> String {
        format!("{}/{}.hgt.gz", self.band(), self.tile_name())
    }

    /// Returns the fractional (row, col) of a coordinate within this tile's
    /// grid, for a grid with `samples` samples per axis.
    ///
    /// Row 0 is the tile's northern edge; grids are stored north to south.
    pub fn local_offset(&self, lat: f64, lon: f64, samples: usize) -> (f64, f64) {
        let lat_frac = lat - f64::from(self.lat);
        let lon_frac = lon - f64::from(self.lon);
        let span = (samples - 1) as f64;

        ((1.0 - lat_frac) * span, lon_frac * span)
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tile_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_coords() {
        assert_eq!(TileKey::for_coord(46.5, 6.5).tile_name(), "N46E006");
        assert_eq!(TileKey::for_coord(35.5, 138.7).tile_name(), "N35E138");
        assert_eq!(TileKey::for_coord(0.5, 0.5).tile_name(), "N00E000");
        assert_eq!(TileKey::for_coord(59.9, 179.9).tile_name(), "N59E179");
    }

    #[test]
    fn test_negative_coords() {
        // floor(-12.3) = -13, floor(-77.1) = -78
        assert_eq!(TileKey::for_coord(-12.3, -77.1).tile_name(), "S13W078");
        // floor(-0.5) = -1
        assert_eq!(TileKey::for_coord(-0.5, -0.5).tile_name(), "S01W001");
        assert_eq!(TileKey::for_coord(-1.0, -1.0).tile_name(), "S01W001");
    }

    #[test]
    fn test_mixed_coords() {
        // floor(-122.4) = -123
        assert_eq!(TileKey::for_coord(35.5, -122.4).tile_name(), "N35W123");
        // floor(-33.9) = -34
        assert_eq!(TileKey::for_coord(-33.9, 151.2).tile_name(), "S34E151");
    }

    #[test]
    fn test_boundary_cases() {
        // Exactly on a tile boundary: floor semantics on both axes.
        assert_eq!(TileKey::for_coord(46.0, 6.0).tile_name(), "N46E006");
        assert_eq!(TileKey::for_coord(0.0, 0.0).tile_name(), "N00E000");
        // floor(-0.1) = -1
        assert_eq!(TileKey::for_coord(-0.1, -0.1).tile_name(), "S01W001");
    }

    #[test]
    fn test_key_is_stable() {
        let a = TileKey::for_coord(46.5, 6.5);
        let b = TileKey::for_coord(46.5, 6.5);
        let c = TileKey::for_coord(46.999, 6.001);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_band_and_object_path() {
        let key = TileKey::for_coord(46.5, 6.5);
        assert_eq!(key.band(), "N46");
        assert_eq!(key.object_path(), "N46/N46E006.hgt.gz");

        let key = TileKey::for_coord(-12.3, -77.1);
        assert_eq!(key.band(), "S13");
        assert_eq!(key.object_path(), "S13/S13W078.hgt.gz");
    }

    #[test]
    fn test_local_offset_center() {
        let key = TileKey::for_coord(46.5, 6.5);
        let (row, col) = key.local_offset(46.5, 6.5, 1201);
        assert_eq!(row, 600.0);
        assert_eq!(col, 600.0);
    }

    #[test]
    fn test_local_offset_corners() {
        let key = TileKey { lat: 46, lon: 6 };

        // Southwest corner is the last row, first column.
        let (row, col) = key.local_offset(46.0, 6.0, 1201);
        assert_eq!(row, 1200.0);
        assert_eq!(col, 0.0);

        // Approaching the northeast corner from inside the tile.
        let (row, col) = key.local_offset(46.9999, 6.9999, 1201);
        assert!(row < 1.0);
        assert!(col > 1199.0);
    }

    #[test]
    fn test_local_offset_negative_tile() {
        let key = TileKey::for_coord(-0.5, -0.5);
        assert_eq!(key, TileKey { lat: -1, lon: -1 });
        let (row, col) = key.local_offset(-0.5, -0.5, 1201);
        assert_eq!(row, 600.0);
        assert_eq!(col, 600.0);
    }
}
