//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::Ini;

use super::defaults::MAX_TILE_PADDING;
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::coord::MAX_ZOOM;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
/// Unknown sections and keys are ignored.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [map] section
    if let Some(section) = ini.section(Some("map")) {
        if let Some(v) = section.get("min_fetch_zoom") {
            config.map.min_fetch_zoom = parse_zoom("map", "min_fetch_zoom", v)?;
        }
        if let Some(v) = section.get("max_zoom") {
            config.map.max_zoom = parse_zoom("map", "max_zoom", v)?;
        }
        if let Some(v) = section.get("tile_padding") {
            let padding: u32 = parse_number("map", "tile_padding", v, "must be a non-negative integer")?;
            if padding > MAX_TILE_PADDING {
                return Err(invalid(
                    "map",
                    "tile_padding",
                    v,
                    &format!("must be at most {}", MAX_TILE_PADDING),
                ));
            }
            config.map.tile_padding = padding;
        }
        if let Some(v) = section.get("debounce_ms") {
            config.map.debounce_ms =
                parse_number("map", "debounce_ms", v, "must be a non-negative integer (milliseconds)")?;
        }

        if config.map.min_fetch_zoom > config.map.max_zoom {
            return Err(invalid(
                "map",
                "min_fetch_zoom",
                &config.map.min_fetch_zoom.to_string(),
                "must not be greater than max_zoom",
            ));
        }
    }

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("capacity") {
            let capacity: usize = parse_number("cache", "capacity", v, "must be a positive integer (tiles)")?;
            if capacity == 0 {
                return Err(invalid("cache", "capacity", v, "must be a positive integer (tiles)"));
            }
            config.cache.capacity = capacity;
        }
        if let Some(v) = section.get("ttl_secs") {
            config.cache.ttl_secs =
                parse_number("cache", "ttl_secs", v, "must be a non-negative integer (seconds, 0 = never)")?;
        }
    }

    // [stores] section
    if let Some(section) = ini.section(Some("stores")) {
        if let Some(v) = section.get("endpoint") {
            config.stores.endpoint = non_empty(v);
        }
        if let Some(v) = section.get("bearer_token") {
            config.stores.bearer_token = non_empty(v);
        }
        if let Some(v) = section.get("timeout_secs") {
            config.stores.timeout_secs =
                parse_number("stores", "timeout_secs", v, "must be a positive integer (seconds)")?;
        }
    }

    // [route] section
    if let Some(section) = ini.section(Some("route")) {
        if let Some(v) = section.get("osrm_url") {
            if let Some(url) = non_empty(v) {
                config.route.osrm_url = url;
            }
        }
        if let Some(v) = section.get("profile") {
            let v = v.trim().to_lowercase();
            if !v.is_empty() {
                config.route.profile = v;
            }
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            if let Some(file) = non_empty(v) {
                config.logging.file = file;
            }
        }
    }

    Ok(config)
}

fn parse_number<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_zoom(section: &str, key: &str, value: &str) -> Result<u8, ConfigFileError> {
    let reason = format!("must be an integer between 0 and {}", MAX_ZOOM);
    let zoom: u8 = parse_number(section, key, value, &reason)?;
    if zoom > MAX_ZOOM {
        return Err(invalid(section, key, value, &reason));
    }
    Ok(zoom)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Expand a leading `~` to the home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn test_empty_file_is_defaults() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_map_section() {
        let config = parse(
            "[map]\nmin_fetch_zoom = 12\ntile_padding = 2\ndebounce_ms = 350\nmax_zoom = 19\n",
        )
        .unwrap();

        assert_eq!(config.map.min_fetch_zoom, 12);
        assert_eq!(config.map.tile_padding, 2);
        assert_eq!(config.map.debounce_ms, 350);
        assert_eq!(config.map.max_zoom, 19);
    }

    #[test]
    fn test_zoom_out_of_range_is_rejected() {
        let err = parse("[map]\nmin_fetch_zoom = 23\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::InvalidValue { ref key, .. } if key == "min_fetch_zoom"
        ));
    }

    #[test]
    fn test_min_zoom_above_max_is_rejected() {
        assert!(parse("[map]\nmin_fetch_zoom = 18\nmax_zoom = 16\n").is_err());
    }

    #[test]
    fn test_padding_limit() {
        assert!(parse("[map]\ntile_padding = 9\n").is_err());
        assert_eq!(parse("[map]\ntile_padding = 0\n").unwrap().map.tile_padding, 0);
    }

    #[test]
    fn test_cache_section() {
        let config = parse("[cache]\ncapacity = 500\nttl_secs = 600\n").unwrap();
        assert_eq!(config.cache.capacity, 500);
        assert_eq!(config.cache.ttl_secs, 600);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let err = parse("[cache]\ncapacity = 0\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad value for [cache] capacity = '0': must be a positive integer (tiles)"
        );
    }

    #[test]
    fn test_non_numeric_value_is_rejected() {
        assert!(parse("[map]\ndebounce_ms = fast\n").is_err());
    }

    #[test]
    fn test_stores_section() {
        let config = parse(
            "[stores]\nendpoint = https://api.example.com/stores/tile\nbearer_token = abc123\ntimeout_secs = 10\n",
        )
        .unwrap();

        assert_eq!(
            config.stores.endpoint.as_deref(),
            Some("https://api.example.com/stores/tile")
        );
        assert_eq!(config.stores.bearer_token.as_deref(), Some("abc123"));
        assert_eq!(config.stores.timeout_secs, 10);
    }

    #[test]
    fn test_empty_values_mean_unset() {
        let config = parse("[stores]\nendpoint =\nbearer_token =   \n").unwrap();
        assert!(config.stores.endpoint.is_none());
        assert!(config.stores.bearer_token.is_none());
    }

    #[test]
    fn test_route_section() {
        let config = parse("[route]\nosrm_url = https://router.example.com\nprofile = Walking\n").unwrap();
        assert_eq!(config.route.osrm_url, "https://router.example.com");
        assert_eq!(config.route.profile, "walking");
    }

    #[test]
    fn test_logging_tilde_expansion() {
        let config = parse("[logging]\ndirectory = ~/shopmap-logs\nfile = map.log\n").unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.logging.directory, home.join("shopmap-logs"));
        }
        assert_eq!(config.logging.file, "map.log");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = parse("[map]\nstyle = dark\n[extras]\nfoo = bar\n").unwrap();
        assert_eq!(config, ConfigFile::default());
    }
}
