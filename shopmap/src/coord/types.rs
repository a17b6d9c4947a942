//! Coordinate type definitions

use std::fmt;

use serde::{Deserialize, Serialize};

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Zoom range accepted by common vector/raster tile servers
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 22;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// One tile in the slippy-map scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileIndex {
    /// Zoom level (0-22)
    pub zoom: u8,
    /// X coordinate (east-west), 0 at the antimeridian west edge
    pub x: u32,
    /// Y coordinate (north-south), 0 at north
    pub y: u32,
}

impl TileIndex {
    pub const fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }
}

impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Geographic bounding box of a tile (or any axis-aligned area).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl TileBounds {
    /// Whether the point lies inside the box, edges included.
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat <= self.north
            && point.lat >= self.south
            && point.lng >= self.west
            && point.lng <= self.east
    }

    /// Midpoint of the box in degrees.
    ///
    /// This is the arithmetic midpoint, not the Mercator midpoint, which is
    /// always strictly inside the tile.
    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: (self.north + self.south) / 2.0,
            lng: (self.east + self.west) / 2.0,
        }
    }

    /// Grows the box so it includes `point`.
    pub fn include(&mut self, point: GeoPoint) {
        self.north = self.north.max(point.lat);
        self.south = self.south.min(point.lat);
        self.east = self.east.max(point.lng);
        self.west = self.west.min(point.lng);
    }

    /// Smallest box containing every point, or `None` for an empty input.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = TileBounds {
            north: first.lat,
            south: first.lat,
            east: first.lng,
            west: first.lng,
        };
        for point in iter {
            bounds.include(*point);
        }
        Some(bounds)
    }
}

/// Inclusive rectangle of tiles at a single zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRange {
    pub zoom: u8,
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl TileRange {
    /// Range covering exactly one tile.
    pub fn single(tile: TileIndex) -> Self {
        Self {
            zoom: tile.zoom,
            min_x: tile.x,
            max_x: tile.x,
            min_y: tile.y,
            max_y: tile.y,
        }
    }

    /// Number of tile columns.
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    /// Number of tile rows.
    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn tile_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn contains(&self, tile: &TileIndex) -> bool {
        tile.zoom == self.zoom
            && (self.min_x..=self.max_x).contains(&tile.x)
            && (self.min_y..=self.max_y).contains(&tile.y)
    }

    /// Whether `other` lies completely inside this range.
    pub fn covers(&self, other: &TileRange) -> bool {
        self.zoom == other.zoom
            && self.min_x <= other.min_x
            && self.max_x >= other.max_x
            && self.min_y <= other.min_y
            && self.max_y >= other.max_y
    }

    /// Grows the range by `padding` tiles on every side, clamped to the
    /// tile grid of this zoom level.
    pub fn expand(&self, padding: u32) -> Self {
        let last = tiles_per_axis(self.zoom) - 1;
        Self {
            zoom: self.zoom,
            min_x: self.min_x.saturating_sub(padding),
            max_x: self.max_x.saturating_add(padding).min(last),
            min_y: self.min_y.saturating_sub(padding),
            max_y: self.max_y.saturating_add(padding).min(last),
        }
    }

    /// Iterates over all tiles in row-major order (north row first).
    pub fn tiles(&self) -> TileRangeIter {
        TileRangeIter {
            range: *self,
            x: self.min_x,
            y: self.min_y,
            done: false,
        }
    }
}

impl fmt::Display for TileRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "z{} x[{}..={}] y[{}..={}]",
            self.zoom, self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}

/// Iterator over the tiles of a [`TileRange`].
#[derive(Debug, Clone)]
pub struct TileRangeIter {
    range: TileRange,
    x: u32,
    y: u32,
    done: bool,
}

impl Iterator for TileRangeIter {
    type Item = TileIndex;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let tile = TileIndex::new(self.range.zoom, self.x, self.y);

        if self.x < self.range.max_x {
            self.x += 1;
        } else if self.y < self.range.max_y {
            self.x = self.range.min_x;
            self.y += 1;
        } else {
            self.done = true;
        }

        Some(tile)
    }
}

/// Number of tiles along one axis at `zoom`.
#[inline]
pub fn tiles_per_axis(zoom: u8) -> u32 {
    1u32 << zoom.min(31)
}

/// The visible map area as reported by the map display on camera idle.
///
/// The four corners are screen corners projected to geographic
/// coordinates. For a rotated or tilted camera they do not form an
/// axis-aligned box; the tile range derived from them is the bounding
/// rectangle, which over-fetches in that case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawViewport")]
pub struct Viewport {
    pub top_left: GeoPoint,
    pub top_right: GeoPoint,
    pub bottom_left: GeoPoint,
    pub bottom_right: GeoPoint,
    pub zoom: u8,
}

impl Viewport {
    /// Builds a viewport, rejecting zoom levels outside `0..=MAX_ZOOM`.
    pub fn new(
        top_left: GeoPoint,
        top_right: GeoPoint,
        bottom_left: GeoPoint,
        bottom_right: GeoPoint,
        zoom: i32,
    ) -> Result<Self, CoordError> {
        Ok(Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
            zoom: validate_zoom(zoom)?,
        })
    }

    /// Builds an axis-aligned viewport from its north-west and south-east
    /// corners.
    pub fn from_bounds(north_west: GeoPoint, south_east: GeoPoint, zoom: i32) -> Result<Self, CoordError> {
        Self::new(
            north_west,
            GeoPoint::new(north_west.lat, south_east.lng),
            GeoPoint::new(south_east.lat, north_west.lng),
            south_east,
            zoom,
        )
    }

    pub fn corners(&self) -> [GeoPoint; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }
}

/// Wire form of [`Viewport`]; the zoom is checked on the way in.
#[derive(Deserialize)]
struct RawViewport {
    top_left: GeoPoint,
    top_right: GeoPoint,
    bottom_left: GeoPoint,
    bottom_right: GeoPoint,
    zoom: i32,
}

impl TryFrom<RawViewport> for Viewport {
    type Error = CoordError;

    fn try_from(raw: RawViewport) -> Result<Self, Self::Error> {
        Viewport::new(
            raw.top_left,
            raw.top_right,
            raw.bottom_left,
            raw.bottom_right,
            raw.zoom,
        )
    }
}

/// Converts a zoom level reported as a signed integer into a tile zoom.
pub fn validate_zoom(zoom: i32) -> Result<u8, CoordError> {
    if !(MIN_ZOOM as i32..=MAX_ZOOM as i32).contains(&zoom) {
        return Err(CoordError::InvalidZoom(zoom));
    }
    Ok(zoom as u8)
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude is outside valid range (-85.05112878 to 85.05112878) or NaN
    InvalidLatitude(f64),
    /// Longitude is outside valid range (-180.0 to 180.0) or NaN
    InvalidLongitude(f64),
    /// Zoom level is outside valid range (0 to 22)
    InvalidZoom(i32),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(
                    f,
                    "Invalid latitude: {} (must be between {} and {})",
                    lat, MIN_LAT, MAX_LAT
                )
            }
            CoordError::InvalidLongitude(lon) => {
                write!(
                    f,
                    "Invalid longitude: {} (must be between {} and {})",
                    lon, MIN_LON, MAX_LON
                )
            }
            CoordError::InvalidZoom(zoom) => {
                write!(
                    f,
                    "Invalid zoom level: {} (must be between {} and {})",
                    zoom, MIN_ZOOM, MAX_ZOOM
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_dimensions() {
        let range = TileRange {
            zoom: 10,
            min_x: 4,
            max_x: 7,
            min_y: 10,
            max_y: 12,
        };
        assert_eq!(range.width(), 4);
        assert_eq!(range.height(), 3);
        assert_eq!(range.tile_count(), 12);
    }

    #[test]
    fn test_range_iterates_row_major() {
        let range = TileRange {
            zoom: 3,
            min_x: 1,
            max_x: 2,
            min_y: 5,
            max_y: 6,
        };
        let tiles: Vec<_> = range.tiles().collect();
        assert_eq!(
            tiles,
            vec![
                TileIndex::new(3, 1, 5),
                TileIndex::new(3, 2, 5),
                TileIndex::new(3, 1, 6),
                TileIndex::new(3, 2, 6),
            ]
        );
    }

    #[test]
    fn test_single_tile_range_iterates_once() {
        let range = TileRange::single(TileIndex::new(0, 0, 0));
        assert_eq!(range.tiles().count(), 1);
    }

    #[test]
    fn test_expand_clamps_to_world() {
        let range = TileRange::single(TileIndex::new(2, 0, 3));
        let expanded = range.expand(2);
        assert_eq!(expanded.min_x, 0);
        assert_eq!(expanded.max_x, 2);
        assert_eq!(expanded.min_y, 1);
        assert_eq!(expanded.max_y, 3);
    }

    #[test]
    fn test_range_contains_checks_zoom() {
        let range = TileRange::single(TileIndex::new(5, 3, 3));
        assert!(range.contains(&TileIndex::new(5, 3, 3)));
        assert!(!range.contains(&TileIndex::new(6, 3, 3)));
    }

    #[test]
    fn test_covers() {
        let outer = TileRange::single(TileIndex::new(8, 10, 10)).expand(2);
        let inner = TileRange::single(TileIndex::new(8, 11, 9));
        assert!(outer.covers(&inner));
        assert!(!inner.covers(&outer));
    }

    #[test]
    fn test_bounds_from_points() {
        let points = [
            GeoPoint::new(10.35, 106.67),
            GeoPoint::new(10.73, 106.72),
            GeoPoint::new(10.50, 106.60),
        ];
        let bounds = TileBounds::from_points(&points).unwrap();
        assert_eq!(bounds.north, 10.73);
        assert_eq!(bounds.south, 10.35);
        assert_eq!(bounds.east, 106.72);
        assert_eq!(bounds.west, 106.60);
        assert!(TileBounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_viewport_rejects_negative_zoom() {
        let p = GeoPoint::new(0.0, 0.0);
        let result = Viewport::new(p, p, p, p, -1);
        assert_eq!(result.unwrap_err(), CoordError::InvalidZoom(-1));
    }

    #[test]
    fn test_viewport_rejects_zoom_above_max() {
        let p = GeoPoint::new(0.0, 0.0);
        assert!(Viewport::new(p, p, p, p, 23).is_err());
        assert!(Viewport::new(p, p, p, p, 22).is_ok());
    }

    #[test]
    fn test_tile_index_display() {
        assert_eq!(TileIndex::new(16, 52000, 30000).to_string(), "16/52000/30000");
    }
}
