//! Configuration for the tile cache.

use std::time::Duration;

/// Default number of tiles remembered before LRU eviction.
pub const DEFAULT_TILE_CACHE_CAPACITY: usize = 200;

/// Configuration for [`TileCache`](super::TileCache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileCacheConfig {
    /// Maximum number of tiles tracked (default: 200).
    pub capacity: usize,
    /// How long a served tile stays fresh.
    ///
    /// `None` keeps tiles until they are evicted or invalidated.
    pub ttl: Option<Duration>,
}

impl TileCacheConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

impl Default for TileCacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_CACHE_CAPACITY)
    }
}
