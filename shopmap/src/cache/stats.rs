//! Tile cache statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the tile cache.
///
/// Held behind an `Arc` so a session handle can read them while the cache
/// itself is owned by the evaluation task.
#[derive(Debug, Default)]
pub struct TileCacheStats {
    /// Range lookups fully satisfied by the cache.
    pub range_hits: AtomicU64,
    /// Range lookups with at least one missing tile.
    pub range_misses: AtomicU64,
    /// Tiles inserted (new or refreshed).
    pub tiles_inserted: AtomicU64,
    /// Tiles dropped to stay within capacity.
    pub evictions: AtomicU64,
    /// Tiles dropped because their TTL ran out.
    pub expirations: AtomicU64,
    /// Tiles removed by explicit invalidation.
    pub invalidations: AtomicU64,
}

impl TileCacheStats {
    pub fn snapshot(&self) -> TileCacheStatsSnapshot {
        TileCacheStatsSnapshot {
            range_hits: self.range_hits.load(Ordering::Relaxed),
            range_misses: self.range_misses.load(Ordering::Relaxed),
            tiles_inserted: self.tiles_inserted.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }

    pub(super) fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`TileCacheStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileCacheStatsSnapshot {
    pub range_hits: u64,
    pub range_misses: u64,
    pub tiles_inserted: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub invalidations: u64,
}

impl TileCacheStatsSnapshot {
    /// Fraction of range lookups served from cache (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.range_hits + self.range_misses;
        if total == 0 {
            0.0
        } else {
            self.range_hits as f64 / total as f64
        }
    }
}
