//! Viewport fetch cache.
//!
//! Tracks which tiles have already been served by the remote store source so
//! that repeated camera-idle events over the same area do not trigger new
//! requests. Entries are individual tiles held in a bounded LRU; a pan only
//! reports the newly exposed tiles as missing.
//!
//! The cache has no lock of its own. It is owned by the single evaluation
//! path of a map session; sharing it across concurrent fetches would need an
//! external mutex around the check-then-insert sequence.

mod config;
mod stats;
mod tile_cache;

pub use config::{TileCacheConfig, DEFAULT_TILE_CACHE_CAPACITY};
pub use stats::{TileCacheStats, TileCacheStatsSnapshot};
pub use tile_cache::TileCache;
