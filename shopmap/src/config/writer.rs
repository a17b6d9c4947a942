//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let endpoint = config.stores.endpoint.as_deref().unwrap_or("");
    let bearer_token = config.stores.bearer_token.as_deref().unwrap_or("");

    format!(
        r#"[map]
; Stores are only fetched at this zoom or closer (default: 14)
min_fetch_zoom = {}
; Extra tiles fetched around the visible area on every side (default: 1, max: 8)
tile_padding = {}
; Quiet period after the camera stops before fetching, in ms (default: 200)
debounce_ms = {}
; Highest zoom level accepted from the map (default: 22)
max_zoom = {}

[cache]
; Number of tiles remembered as already fetched (default: 200)
capacity = {}
; Seconds before a fetched tile is fetched again (default: 0 = never)
ttl_secs = {}

[stores]
; Store listing endpoint (POST, JSON). Leave empty to disable store fetching
endpoint = {}
; Sent as "Authorization: Bearer <token>" when set
bearer_token = {}
; Request timeout in seconds (default: 30)
timeout_secs = {}

[route]
; OSRM server used for driving routes
osrm_url = {}
; OSRM profile: driving, walking, cycling
profile = {}

[logging]
; Directory for the log file (default: logs)
directory = {}
; Log file name, truncated at every start (default: shopmap.log)
file = {}
"#,
        config.map.min_fetch_zoom,
        config.map.tile_padding,
        config.map.debounce_ms,
        config.map.max_zoom,
        config.cache.capacity,
        config.cache.ttl_secs,
        endpoint,
        bearer_token,
        config.stores.timeout_secs,
        config.route.osrm_url,
        config.route.profile,
        path_to_string(&config.logging.directory),
        config.logging.file,
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
