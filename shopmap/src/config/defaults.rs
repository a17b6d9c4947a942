//! Default values and constants for all configuration settings.

use std::path::PathBuf;

use super::settings::*;
use crate::cache::DEFAULT_TILE_CACHE_CAPACITY;
use crate::coord::MAX_ZOOM;
use crate::http::DEFAULT_HTTP_TIMEOUT_SECS;
use crate::logging::{DEFAULT_LOG_DIR, DEFAULT_LOG_FILE};
use crate::route::{DEFAULT_OSRM_URL, DEFAULT_ROUTE_PROFILE};
use crate::viewport::{DEFAULT_DEBOUNCE, DEFAULT_MIN_FETCH_ZOOM, DEFAULT_TILE_PADDING};

/// Default cache TTL (0 = tiles never expire).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 0;

/// Largest padding accepted from the config file.
pub const MAX_TILE_PADDING: u32 = 8;

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            min_fetch_zoom: DEFAULT_MIN_FETCH_ZOOM,
            tile_padding: DEFAULT_TILE_PADDING,
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_TILE_CACHE_CAPACITY,
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            bearer_token: None,
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            osrm_url: DEFAULT_OSRM_URL.to_string(),
            profile: DEFAULT_ROUTE_PROFILE.to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIR),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}
