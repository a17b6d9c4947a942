//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use shopmap::config::{config_file_path, ConfigFile};
use shopmap::coord::{GeoPoint, Viewport};
use shopmap::logging::{init_logging, LoggingGuard};
use tracing::debug;

use crate::error::CliError;

/// Parses `lat,lng` into a point.
pub fn parse_point(value: &str) -> Result<GeoPoint, String> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| format!("expected 'lat,lng', got '{}'", value))?;

    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", lng.trim()))?;

    Ok(GeoPoint::new(lat, lng))
}

/// Viewport given either as two opposite corners or as four screen corners.
#[derive(Debug, Clone, Args)]
pub struct ViewportArgs {
    /// North-west corner as lat,lng
    #[arg(long, value_parser = parse_point, requires = "south_east", conflicts_with = "corner")]
    pub north_west: Option<GeoPoint>,

    /// South-east corner as lat,lng
    #[arg(long, value_parser = parse_point, requires = "north_west")]
    pub south_east: Option<GeoPoint>,

    /// Screen corner as lat,lng; give four times in the order
    /// top-left, top-right, bottom-left, bottom-right
    #[arg(long, value_parser = parse_point)]
    pub corner: Vec<GeoPoint>,

    /// Camera zoom level
    #[arg(long)]
    pub zoom: i32,
}

impl ViewportArgs {
    pub fn to_viewport(&self) -> Result<Viewport, CliError> {
        if let (Some(north_west), Some(south_east)) = (self.north_west, self.south_east) {
            return Ok(Viewport::from_bounds(north_west, south_east, self.zoom)?);
        }

        match self.corner.as_slice() {
            [top_left, top_right, bottom_left, bottom_right] => Ok(Viewport::new(
                *top_left,
                *top_right,
                *bottom_left,
                *bottom_right,
                self.zoom,
            )?),
            [] => Err(CliError::InvalidArgument(
                "give --north-west and --south-east, or --corner four times".to_string(),
            )),
            corners => Err(CliError::InvalidArgument(format!(
                "--corner must be given exactly four times, got {}",
                corners.len()
            ))),
        }
    }
}

/// Loaded configuration plus active logging for commands that talk to the
/// network.
pub struct CommandContext {
    pub config: ConfigFile,
    _logging: LoggingGuard,
}

impl CommandContext {
    pub fn new(config_path: Option<PathBuf>, verbose: bool) -> Result<Self, CliError> {
        let config = load_config(config_path)?;

        let level = if verbose { "debug" } else { "info" };
        let logging = init_logging(&config.logging.directory, &config.logging.file, level)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;
        debug!(log_file = %logging.log_path().display(), "Logging initialized");

        Ok(Self {
            config,
            _logging: logging,
        })
    }

    /// Single-threaded runtime for one command.
    pub fn runtime(&self) -> Result<tokio::runtime::Runtime, CliError> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)
    }
}

/// Pretty JSON for command output.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError::Output(e.to_string()))
}

/// Loads the config from `path`, or from the default location.
pub fn load_config(path: Option<PathBuf>) -> Result<ConfigFile, CliError> {
    let path = path.unwrap_or_else(config_file_path);
    Ok(ConfigFile::load_from(&path)?)
}
