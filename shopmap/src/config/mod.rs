//! Configuration for the shopmap components.
//!
//! User settings live in `~/.shopmap/config.ini`:
//!
//! ```ini
//! [map]
//! min_fetch_zoom = 14
//! tile_padding = 1
//! debounce_ms = 200
//! max_zoom = 22
//!
//! [cache]
//! capacity = 200
//! ttl_secs = 0
//!
//! [stores]
//! endpoint = https://api.example.com/stores/tile
//! bearer_token =
//! timeout_secs = 30
//!
//! [route]
//! osrm_url = http://localhost:5000
//! profile = driving
//!
//! [logging]
//! directory = logs
//! file = shopmap.log
//! ```
//!
//! [`ConfigFile`] is the parsed file; its `*_config()` methods produce the
//! runtime settings each component takes.

mod convert;
mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    CacheSettings, ConfigFile, LoggingSettings, MapSettings, RouteSettings, StoreSettings,
};
