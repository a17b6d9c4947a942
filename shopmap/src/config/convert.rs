//! Conversions from file settings to the runtime configs each component
//! takes.

use std::time::Duration;

use super::settings::ConfigFile;
use crate::cache::TileCacheConfig;
use crate::route::RouteSourceConfig;
use crate::stores::StoreSourceConfig;
use crate::viewport::{FetchConfig, SessionConfig};

impl ConfigFile {
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            min_fetch_zoom: self.map.min_fetch_zoom,
            padding: self.map.tile_padding,
            max_zoom: self.map.max_zoom,
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::with_debounce(Duration::from_millis(self.map.debounce_ms))
    }

    /// Tile cache settings. A TTL of zero disables expiry.
    pub fn tile_cache_config(&self) -> TileCacheConfig {
        let config = TileCacheConfig::new(self.cache.capacity);
        match self.cache.ttl_secs {
            0 => config,
            secs => config.with_ttl(Duration::from_secs(secs)),
        }
    }

    pub fn store_source_config(&self) -> StoreSourceConfig {
        StoreSourceConfig {
            endpoint: self.stores.endpoint.clone().unwrap_or_default(),
            bearer_token: self.stores.bearer_token.clone(),
            timeout: Duration::from_secs(self.stores.timeout_secs),
        }
    }

    pub fn route_source_config(&self) -> RouteSourceConfig {
        RouteSourceConfig {
            osrm_url: self.route.osrm_url.clone(),
            profile: self.route.profile.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_component_defaults() {
        let config = ConfigFile::default();

        assert_eq!(config.fetch_config(), FetchConfig::default());
        assert_eq!(config.session_config(), SessionConfig::default());
        assert_eq!(config.tile_cache_config(), TileCacheConfig::default());
        assert_eq!(config.store_source_config(), StoreSourceConfig::default());
        assert_eq!(config.route_source_config(), RouteSourceConfig::default());
    }

    #[test]
    fn test_ttl_conversion() {
        let mut config = ConfigFile::default();
        config.cache.ttl_secs = 120;

        assert_eq!(
            config.tile_cache_config().ttl,
            Some(Duration::from_secs(120))
        );
    }

    #[test]
    fn test_store_source_conversion() {
        let mut config = ConfigFile::default();
        config.stores.endpoint = Some("https://api.example.com/stores/tile".to_string());
        config.stores.bearer_token = Some("abc".to_string());
        config.stores.timeout_secs = 5;

        let source = config.store_source_config();
        assert!(source.is_configured());
        assert_eq!(source.bearer_token.as_deref(), Some("abc"));
        assert_eq!(source.timeout, Duration::from_secs(5));
    }
}
