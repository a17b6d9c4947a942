//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    /// Viewport and debounce settings
    pub map: MapSettings,
    /// Tile cache settings
    pub cache: CacheSettings,
    /// Store backend settings
    pub stores: StoreSettings,
    /// Routing server settings
    pub route: RouteSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// `[map]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSettings {
    /// Viewports below this zoom never fetch
    pub min_fetch_zoom: u8,
    /// Tiles of padding around the visible range
    pub tile_padding: u32,
    /// Quiet period after the last camera event, in milliseconds
    pub debounce_ms: u64,
    /// Highest zoom accepted from the map
    pub max_zoom: u8,
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Maximum number of tiles remembered
    pub capacity: usize,
    /// Seconds before a served tile counts as missing again (0 = never)
    pub ttl_secs: u64,
}

/// `[stores]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Listing endpoint URL (None = not configured)
    pub endpoint: Option<String>,
    /// Bearer token for the listing endpoint
    pub bearer_token: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// `[route]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSettings {
    /// OSRM base URL
    pub osrm_url: String,
    /// OSRM profile (driving, walking, cycling)
    pub profile: String,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Directory for the log file
    pub directory: PathBuf,
    /// Log file name
    pub file: String,
}
