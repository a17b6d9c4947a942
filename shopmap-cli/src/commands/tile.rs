//! Tile math commands: `tile` and `range`.

use clap::Args;
use serde::Serialize;
use shopmap::coord::{
    point_to_tile, tile_to_bounds, validate_zoom, viewport_to_tile_range, TileBounds, TileIndex,
    TileRange,
};
use shopmap::viewport::DEFAULT_TILE_PADDING;

use super::common::{to_json, ViewportArgs};
use crate::error::CliError;

/// Arguments for `shopmap tile`.
#[derive(Debug, Args)]
pub struct TileArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Zoom level (0-22)
    #[arg(long, default_value = "16")]
    pub zoom: i32,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `shopmap range`.
#[derive(Debug, Args)]
pub struct RangeArgs {
    #[command(flatten)]
    pub viewport: ViewportArgs,

    /// Tiles of padding on every side
    #[arg(long, default_value_t = DEFAULT_TILE_PADDING)]
    pub padding: u32,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct TileReport {
    zoom: u8,
    x: u32,
    y: u32,
    bounds: TileBounds,
}

#[derive(Serialize)]
struct RangeReport {
    zoom: u8,
    min_x: u32,
    max_x: u32,
    min_y: u32,
    max_y: u32,
    width: u32,
    height: u32,
    tiles: u64,
}

impl From<TileIndex> for TileReport {
    fn from(tile: TileIndex) -> Self {
        Self {
            zoom: tile.zoom,
            x: tile.x,
            y: tile.y,
            bounds: tile_to_bounds(tile.x, tile.y, tile.zoom),
        }
    }
}

impl From<TileRange> for RangeReport {
    fn from(range: TileRange) -> Self {
        Self {
            zoom: range.zoom,
            min_x: range.min_x,
            max_x: range.max_x,
            min_y: range.min_y,
            max_y: range.max_y,
            width: range.width(),
            height: range.height(),
            tiles: range.tile_count(),
        }
    }
}

/// Run `shopmap tile`.
pub fn run_tile(args: TileArgs) -> Result<(), CliError> {
    let zoom = validate_zoom(args.zoom)?;
    let tile = point_to_tile(args.lat, args.lng, zoom)?;
    let report = TileReport::from(tile);

    if args.json {
        println!("{}", to_json(&report)?);
    } else {
        print!("{}", format_tile(&report));
    }
    Ok(())
}

/// Run `shopmap range`.
pub fn run_range(args: RangeArgs) -> Result<(), CliError> {
    let viewport = args.viewport.to_viewport()?;
    let range = viewport_to_tile_range(&viewport, args.padding)?;
    let report = RangeReport::from(range);

    if args.json {
        println!("{}", to_json(&report)?);
    } else {
        print!("{}", format_range(&report));
    }
    Ok(())
}

fn format_tile(report: &TileReport) -> String {
    format!(
        "Tile: {}/{}/{}\n  North: {:.6}\n  South: {:.6}\n  West:  {:.6}\n  East:  {:.6}\n",
        report.zoom,
        report.x,
        report.y,
        report.bounds.north,
        report.bounds.south,
        report.bounds.west,
        report.bounds.east
    )
}

fn format_range(report: &RangeReport) -> String {
    format!(
        "Zoom: {}\n  x: {}..={}\n  y: {}..={}\n  Size: {}x{} ({} tiles)\n",
        report.zoom,
        report.min_x,
        report.max_x,
        report.min_y,
        report.max_y,
        report.width,
        report.height,
        report.tiles
    )
}
