//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator slippy-map tile indices, plus the viewport → tile range
//! computation that drives store fetching.

mod types;

pub use types::{
    tiles_per_axis, validate_zoom, CoordError, GeoPoint, TileBounds, TileIndex, TileRange,
    TileRangeIter, Viewport, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Converts geographic coordinates to the tile containing them.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lng` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 22)
///
/// # Returns
///
/// A `Result` containing the tile index or an error if inputs are invalid.
/// Points on the east or south edge of the world map to the last tile.
#[inline]
pub fn point_to_tile(lat: f64, lng: f64, zoom: u8) -> Result<TileIndex, CoordError> {
    // NaN fails both range checks
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lng) {
        return Err(CoordError::InvalidLongitude(lng));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom as i32));
    }

    let n = tiles_per_axis(zoom) as f64;
    let last = n - 1.0;

    let x = ((lng + 180.0) / 360.0 * n).floor();

    // ln(tan φ + sec φ) == asinh(tan φ)
    let lat_rad = lat.to_radians();
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).floor();

    Ok(TileIndex {
        zoom,
        x: x.clamp(0.0, last) as u32,
        y: y.clamp(0.0, last) as u32,
    })
}

/// Returns the geographic bounding box of a tile.
///
/// Exact inverse of [`point_to_tile`]: the west/north edges are the
/// coordinates of tile `(x, y)`, the east/south edges those of
/// `(x + 1, y + 1)`.
#[inline]
pub fn tile_to_bounds(x: u32, y: u32, zoom: u8) -> TileBounds {
    let n = tiles_per_axis(zoom) as f64;

    TileBounds {
        north: tile_y_to_lat(y as f64, n),
        south: tile_y_to_lat(y as f64 + 1.0, n),
        west: tile_x_to_lng(x as f64, n),
        east: tile_x_to_lng(x as f64 + 1.0, n),
    }
}

#[inline]
fn tile_x_to_lng(x: f64, n: f64) -> f64 {
    x / n * 360.0 - 180.0
}

#[inline]
fn tile_y_to_lat(y: f64, n: f64) -> f64 {
    (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees()
}

/// Computes the padded tile range covering a viewport.
///
/// Every corner is mapped with [`point_to_tile`], the min/max of x and y are
/// taken independently and the result is grown by `padding` tiles on each
/// side (clamped to the world). Corner latitudes beyond the Mercator band and
/// longitudes beyond ±180° are clamped first, since the map display projects
/// screen corners past the poles or the antimeridian at low zoom. NaN corners
/// are rejected.
pub fn viewport_to_tile_range(viewport: &Viewport, padding: u32) -> Result<TileRange, CoordError> {
    let [first, rest @ ..] = viewport.corners();
    let mut range = TileRange::single(corner_to_tile(first, viewport.zoom)?);

    for corner in rest {
        let tile = corner_to_tile(corner, viewport.zoom)?;
        range.min_x = range.min_x.min(tile.x);
        range.max_x = range.max_x.max(tile.x);
        range.min_y = range.min_y.min(tile.y);
        range.max_y = range.max_y.max(tile.y);
    }

    Ok(range.expand(padding))
}

fn corner_to_tile(corner: GeoPoint, zoom: u8) -> Result<TileIndex, CoordError> {
    if corner.lat.is_nan() {
        return Err(CoordError::InvalidLatitude(corner.lat));
    }
    if corner.lng.is_nan() {
        return Err(CoordError::InvalidLongitude(corner.lng));
    }
    point_to_tile(
        corner.lat.clamp(MIN_LAT, MAX_LAT),
        corner.lng.clamp(MIN_LON, MAX_LON),
        zoom,
    )
}
