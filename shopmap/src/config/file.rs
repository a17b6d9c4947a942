//! Reading and writing `~/.shopmap/config.ini`.
//!
//! A missing file is not an error: every section falls back to the values in
//! [`super::defaults`]. Parsing lives in [`super::parser`], the commented
//! output format in [`super::writer`].

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::{debug, info};

use super::settings::ConfigFile;

const CONFIG_DIR_NAME: &str = ".shopmap";
const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors from loading or saving the config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file exists but is not valid INI
    #[error("Cannot parse config file: {0}")]
    ReadError(#[from] ini::Error),

    #[error("Cannot write config file: {0}")]
    WriteError(String),

    /// A key holds a value the fetch core cannot use
    #[error("Bad value for [{section}] {key} = '{value}': {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("Cannot create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Reads `~/.shopmap/config.ini`, or returns defaults if it is missing.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Reads the file at `path`, or returns defaults if it is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        let config = super::parser::parse_ini(&ini)?;
        debug!(path = %path.display(), "Config file loaded");
        Ok(config)
    }

    /// Writes this configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(ConfigFileError::DirectoryError)?;
        }

        std::fs::write(path, self.to_config_string())
            .map_err(|e| ConfigFileError::WriteError(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Config file written");
        Ok(())
    }

    /// Commented INI text for this configuration.
    pub fn to_config_string(&self) -> String {
        super::writer::to_config_string(self)
    }

    /// Writes a default config to `path` unless a file is already there.
    ///
    /// Returns whether a file was written.
    pub fn ensure_exists_at(path: &Path) -> Result<bool, ConfigFileError> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        Ok(true)
    }
}

/// `~/.shopmap`, or `./.shopmap` when there is no home directory.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// `~/.shopmap/config.ini`.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CACHE_TTL_SECS;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.map.min_fetch_zoom, 14);
        assert_eq!(config.map.tile_padding, 1);
        assert_eq!(config.map.debounce_ms, 200);
        assert_eq!(config.cache.capacity, 200);
        assert_eq!(config.cache.ttl_secs, DEFAULT_CACHE_TTL_SECS);
        assert!(config.stores.endpoint.is_none());
        assert_eq!(config.route.osrm_url, "http://localhost:5000");
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.map.min_fetch_zoom = 15;
        config.cache.ttl_secs = 900;
        config.stores.endpoint = Some("https://api.example.com/stores/tile".to_string());
        config.stores.bearer_token = Some("abc123".to_string());
        config.route.profile = "cycling".to_string();

        config.save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(loaded.map.min_fetch_zoom, 15);
        assert_eq!(loaded.cache.ttl_secs, 900);
        assert_eq!(loaded.stores.endpoint, config.stores.endpoint);
        assert_eq!(loaded.stores.bearer_token.as_deref(), Some("abc123"));
        assert_eq!(loaded.route.profile, "cycling");
    }

    #[test]
    fn test_ensure_exists_at_does_not_overwrite() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        assert!(ConfigFile::ensure_exists_at(&config_path).unwrap());
        std::fs::write(&config_path, "[map]\nmin_fetch_zoom = 16\n").unwrap();
        assert!(!ConfigFile::ensure_exists_at(&config_path).unwrap());

        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded.map.min_fetch_zoom, 16);
    }

    #[test]
    fn test_invalid_file_reports_value() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, "[cache]\ncapacity = lots\n").unwrap();

        let err = ConfigFile::load_from(&config_path).unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { .. }));
    }

    #[test]
    fn test_config_file_path() {
        let path = config_file_path();
        assert!(path.ends_with(".shopmap/config.ini"));
    }
}
