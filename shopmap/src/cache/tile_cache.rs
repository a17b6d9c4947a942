//! Per-tile LRU membership cache.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use lru::LruCache;
use tracing::trace;

use super::config::TileCacheConfig;
use super::stats::TileCacheStats;
use crate::coord::{TileIndex, TileRange};

/// Remembers which tiles have already been fetched.
///
/// Each entry records when the tile was served. Lookups through
/// [`missing_range`](Self::missing_range) refresh recency of the tiles still
/// on screen so they are not evicted while visible; [`has`](Self::has) leaves
/// recency alone. Both drop entries whose TTL has run out.
pub struct TileCache {
    entries: LruCache<TileIndex, Instant>,
    config: TileCacheConfig,
    stats: Arc<TileCacheStats>,
}

impl TileCache {
    /// Creates an empty cache. A capacity of zero is treated as one.
    pub fn new(config: TileCacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            config,
            stats: Arc::new(TileCacheStats::default()),
        }
    }

    /// Shared statistics handle.
    pub fn stats(&self) -> Arc<TileCacheStats> {
        Arc::clone(&self.stats)
    }

    pub fn config(&self) -> &TileCacheConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `tile` has been served and is still fresh.
    pub fn has(&mut self, tile: &TileIndex) -> bool {
        let Some(served_at) = self.entries.peek(tile).copied() else {
            return false;
        };
        !self.drop_if_expired(tile, served_at)
    }

    /// Marks `tile` as served now, evicting the least recently used tile if
    /// the cache is full.
    pub fn put(&mut self, tile: TileIndex) {
        if let Some((evicted, _)) = self.entries.push(tile, Instant::now()) {
            if evicted != tile {
                trace!(tile = %evicted, "Tile evicted from fetch cache");
                TileCacheStats::add(&self.stats.evictions, 1);
            }
        }
        TileCacheStats::add(&self.stats.tiles_inserted, 1);
    }

    /// Marks every tile of `range` as served.
    pub fn mark_range_served(&mut self, range: &TileRange) {
        for tile in range.tiles() {
            self.put(tile);
        }
    }

    /// Returns the smallest range covering every tile of `range` that has not
    /// been served, or `None` when the whole range is fresh.
    ///
    /// Fresh tiles are touched so they stay at the front of the LRU order;
    /// expired tiles are dropped.
    pub fn missing_range(&mut self, range: &TileRange) -> Option<TileRange> {
        let mut missing: Option<TileRange> = None;

        for tile in range.tiles() {
            if self.touch_if_fresh(&tile) {
                continue;
            }
            missing = Some(match missing {
                None => TileRange::single(tile),
                Some(m) => TileRange {
                    zoom: m.zoom,
                    min_x: m.min_x.min(tile.x),
                    max_x: m.max_x.max(tile.x),
                    min_y: m.min_y.min(tile.y),
                    max_y: m.max_y.max(tile.y),
                },
            });
        }

        match missing {
            Some(_) => TileCacheStats::add(&self.stats.range_misses, 1),
            None => TileCacheStats::add(&self.stats.range_hits, 1),
        }

        missing
    }

    /// Forgets a single tile so its next lookup is a miss.
    pub fn invalidate(&mut self, tile: &TileIndex) -> bool {
        let removed = self.entries.pop(tile).is_some();
        if removed {
            TileCacheStats::add(&self.stats.invalidations, 1);
        }
        removed
    }

    /// Forgets every cached tile inside `range`. Returns the number removed.
    pub fn invalidate_range(&mut self, range: &TileRange) -> usize {
        let doomed: Vec<TileIndex> = self
            .entries
            .iter()
            .map(|(tile, _)| *tile)
            .filter(|tile| range.contains(tile))
            .collect();

        for tile in &doomed {
            self.entries.pop(tile);
        }

        TileCacheStats::add(&self.stats.invalidations, doomed.len() as u64);
        doomed.len()
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        TileCacheStats::add(&self.stats.invalidations, count as u64);
    }

    fn touch_if_fresh(&mut self, tile: &TileIndex) -> bool {
        let Some(served_at) = self.entries.get(tile).copied() else {
            return false;
        };
        !self.drop_if_expired(tile, served_at)
    }

    /// Removes `tile` if its TTL has run out. Returns whether it was removed.
    fn drop_if_expired(&mut self, tile: &TileIndex, served_at: Instant) -> bool {
        if !self.is_expired(served_at) {
            return false;
        }
        self.entries.pop(tile);
        TileCacheStats::add(&self.stats.expirations, 1);
        trace!(tile = %tile, "Tile expired from fetch cache");
        true
    }

    fn is_expired(&self, served_at: Instant) -> bool {
        self.config
            .ttl
            .is_some_and(|ttl| served_at.elapsed() >= ttl)
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new(TileCacheConfig::default())
    }
}

impl std::fmt::Debug for TileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity())
            .field("ttl", &self.config.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_TILE_CACHE_CAPACITY;
    use std::time::Duration;

    fn range(zoom: u8, min_x: u32, max_x: u32, min_y: u32, max_y: u32) -> TileRange {
        TileRange {
            zoom,
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    #[test]
    fn test_empty_cache_has_nothing() {
        let mut cache = TileCache::default();
        assert!(cache.is_empty());
        assert!(!cache.has(&TileIndex::new(16, 1, 1)));
        assert_eq!(cache.capacity(), DEFAULT_TILE_CACHE_CAPACITY);
    }

    #[test]
    fn test_put_then_has() {
        let mut cache = TileCache::default();
        let tile = TileIndex::new(16, 52192, 30794);

        cache.put(tile);

        assert!(cache.has(&tile));
        assert!(!cache.has(&TileIndex::new(15, 52192, 30794)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_same_tile_twice_is_not_an_eviction() {
        let mut cache = TileCache::new(TileCacheConfig::new(2));
        let tile = TileIndex::new(14, 3, 3);

        cache.put(tile);
        cache.put(tile);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().snapshot().evictions, 0);
        assert_eq!(cache.stats().snapshot().tiles_inserted, 2);
    }

    #[test]
    fn test_lru_eviction_at_capacity() {
        let mut cache = TileCache::new(TileCacheConfig::new(3));
        let a = TileIndex::new(14, 0, 0);
        let b = TileIndex::new(14, 1, 0);
        let c = TileIndex::new(14, 2, 0);
        let d = TileIndex::new(14, 3, 0);

        cache.put(a);
        cache.put(b);
        cache.put(c);
        // Touch `a` so `b` becomes the least recently used
        assert!(cache.missing_range(&TileRange::single(a)).is_none());
        cache.put(d);

        assert!(cache.has(&a));
        assert!(!cache.has(&b));
        assert!(cache.has(&c));
        assert!(cache.has(&d));
        assert_eq!(cache.stats().snapshot().evictions, 1);
    }

    #[test]
    fn test_has_does_not_change_recency() {
        let mut cache = TileCache::new(TileCacheConfig::new(2));
        let a = TileIndex::new(14, 0, 0);
        let b = TileIndex::new(14, 1, 0);

        cache.put(a);
        cache.put(b);
        assert!(cache.has(&a));
        cache.put(TileIndex::new(14, 2, 0));

        // `a` was still the oldest entry
        assert!(!cache.has(&a));
        assert!(cache.has(&b));
    }

    #[test]
    fn test_zero_capacity_is_treated_as_one() {
        let mut cache = TileCache::new(TileCacheConfig::new(0));
        cache.put(TileIndex::new(14, 0, 0));
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_range_on_empty_cache_is_whole_range() {
        let mut cache = TileCache::default();
        let r = range(16, 10, 13, 20, 22);

        assert_eq!(cache.missing_range(&r), Some(r));
        assert_eq!(cache.stats().snapshot().range_misses, 1);
    }

    #[test]
    fn test_missing_range_after_serving_is_none() {
        let mut cache = TileCache::default();
        let r = range(16, 10, 13, 20, 22);

        cache.mark_range_served(&r);

        assert_eq!(cache.len(), 12);
        assert!(cache.missing_range(&r).is_none());
        assert_eq!(cache.stats().snapshot().range_hits, 1);
    }

    #[test]
    fn test_missing_range_after_pan_is_exposed_strip() {
        let mut cache = TileCache::default();
        cache.mark_range_served(&range(16, 10, 15, 20, 24));

        // Pan one column east
        let panned = range(16, 11, 16, 20, 24);

        assert_eq!(cache.missing_range(&panned), Some(range(16, 16, 16, 20, 24)));
    }

    #[test]
    fn test_missing_range_at_other_zoom_is_full_miss() {
        let mut cache = TileCache::default();
        cache.mark_range_served(&range(15, 0, 3, 0, 3));

        let other_zoom = range(16, 0, 3, 0, 3);
        assert_eq!(cache.missing_range(&other_zoom), Some(other_zoom));
    }

    #[test]
    fn test_invalidate_tile() {
        let mut cache = TileCache::default();
        let r = range(16, 0, 2, 0, 2);
        cache.mark_range_served(&r);

        assert!(cache.invalidate(&TileIndex::new(16, 1, 1)));
        assert!(!cache.invalidate(&TileIndex::new(16, 9, 9)));

        assert_eq!(cache.missing_range(&r), Some(range(16, 1, 1, 1, 1)));
        assert_eq!(cache.stats().snapshot().invalidations, 1);
    }

    #[test]
    fn test_invalidate_range_only_touches_inside() {
        let mut cache = TileCache::default();
        cache.mark_range_served(&range(16, 0, 3, 0, 0));

        let removed = cache.invalidate_range(&range(16, 1, 2, 0, 0));

        assert_eq!(removed, 2);
        assert!(cache.has(&TileIndex::new(16, 0, 0)));
        assert!(!cache.has(&TileIndex::new(16, 1, 0)));
        assert!(!cache.has(&TileIndex::new(16, 2, 0)));
        assert!(cache.has(&TileIndex::new(16, 3, 0)));
    }

    #[test]
    fn test_clear() {
        let mut cache = TileCache::default();
        cache.mark_range_served(&range(16, 0, 1, 0, 1));

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.stats().snapshot().invalidations, 4);
    }

    #[test]
    fn test_expired_tiles_are_missing() {
        let mut cache = TileCache::new(TileCacheConfig::new(10).with_ttl(Duration::ZERO));
        let tile = TileIndex::new(14, 5, 5);
        cache.put(tile);

        assert!(!cache.has(&tile));
        assert_eq!(
            cache.missing_range(&TileRange::single(tile)),
            Some(TileRange::single(tile))
        );
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().snapshot().expirations, 1);
    }

    #[test]
    fn test_has_drops_and_counts_expired_tile() {
        let mut cache = TileCache::new(TileCacheConfig::new(10).with_ttl(Duration::ZERO));
        let tile = TileIndex::new(14, 5, 5);
        cache.put(tile);
        assert_eq!(cache.len(), 1);

        assert!(!cache.has(&tile));

        assert!(cache.is_empty());
        assert_eq!(cache.stats().snapshot().expirations, 1);

        // Already gone, so a second lookup does not count again
        assert!(!cache.has(&tile));
        assert_eq!(cache.stats().snapshot().expirations, 1);
    }

    #[test]
    fn test_fresh_tiles_within_ttl() {
        let mut cache =
            TileCache::new(TileCacheConfig::new(10).with_ttl(Duration::from_secs(3600)));
        let tile = TileIndex::new(14, 5, 5);
        cache.put(tile);

        assert!(cache.has(&tile));
        assert!(cache.missing_range(&TileRange::single(tile)).is_none());
    }
}
