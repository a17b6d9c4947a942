//! Single viewport evaluation.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::config::FetchConfig;
use crate::cache::TileCache;
use crate::coord::{
    point_to_tile, viewport_to_tile_range, CoordError, TileIndex, TileRange, Viewport, MAX_LAT,
    MAX_LON, MIN_LAT, MIN_LON,
};
use crate::render::{FeatureCollection, RenderSink, STORE_LAYER};
use crate::stores::{FetchError, Store, StoreSource};

/// Result of evaluating one viewport.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Zoomed out past the fetch floor. Nothing was fetched or drawn.
    BelowMinZoom,
    /// Every tile of the padded range was already served.
    CacheHit(TileRange),
    /// `range` was fetched and the store layer redrawn.
    Fetched { range: TileRange, items: Vec<Store> },
    /// The fetch for `range` failed; its tiles stay unserved.
    Failed { range: TileRange, error: FetchError },
    /// The viewport could not be mapped to tiles.
    Rejected(CoordError),
}

impl FetchOutcome {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchOutcome::BelowMinZoom => "below_min_zoom",
            FetchOutcome::CacheHit(_) => "cache_hit",
            FetchOutcome::Fetched { .. } => "fetched",
            FetchOutcome::Failed { .. } => "failed",
            FetchOutcome::Rejected(_) => "rejected",
        }
    }
}

/// Counters for viewport evaluations.
#[derive(Debug, Default)]
pub struct FetcherStats {
    /// Viewports evaluated.
    pub evaluations: AtomicU64,
    /// Viewports skipped by the zoom gate.
    pub below_min_zoom: AtomicU64,
    /// Viewports fully covered by the cache.
    pub cache_hits: AtomicU64,
    /// Requests sent to the store source.
    pub fetches: AtomicU64,
    /// Requests for ranges larger than the cache, sent without caching.
    pub uncached_fetches: AtomicU64,
    /// Requests that failed.
    pub fetch_failures: AtomicU64,
    /// Viewports with invalid geography.
    pub rejected: AtomicU64,
    /// Stores received across all fetches.
    pub stores_received: AtomicU64,
}

impl FetcherStats {
    pub fn snapshot(&self) -> FetcherStatsSnapshot {
        FetcherStatsSnapshot {
            evaluations: self.evaluations.load(Ordering::Relaxed),
            below_min_zoom: self.below_min_zoom.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            uncached_fetches: self.uncached_fetches.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            stores_received: self.stores_received.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of [`FetcherStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetcherStatsSnapshot {
    pub evaluations: u64,
    pub below_min_zoom: u64,
    pub cache_hits: u64,
    pub fetches: u64,
    pub uncached_fetches: u64,
    pub fetch_failures: u64,
    pub rejected: u64,
    pub stores_received: u64,
}

/// A displayed store and the served tile it belongs to.
#[derive(Debug, Clone)]
struct ShownStore {
    tile: TileIndex,
    store: Store,
}

/// Turns viewports into store fetches.
///
/// Owns the tile cache and the set of stores shown. Every shown store belongs
/// to one served tile: the tile containing it, clamped into the range it was
/// fetched for. Each successful fetch replaces the stores of the refetched
/// tiles, merges the rest by store id and redraws the set on
/// [`STORE_LAYER`], so stores from earlier fetches stay visible after a pan.
/// Stores whose tile is evicted, expires or is invalidated are dropped.
///
/// A padded range with more tiles than the cache holds is fetched as a whole
/// and not cached. Its stores are shown until the next evaluation that
/// reaches the cache.
///
/// A failed fetch leaves the cache untouched; the next camera-idle event over
/// the same area tries again. There is no retry loop.
pub struct ViewportFetcher<S: StoreSource, R: RenderSink> {
    cache: TileCache,
    source: S,
    sink: R,
    config: FetchConfig,
    stores: BTreeMap<String, ShownStore>,
    uncached: Vec<Store>,
    stats: Arc<FetcherStats>,
}

impl<S: StoreSource, R: RenderSink> ViewportFetcher<S, R> {
    /// Creates a fetcher with the default configuration and cache.
    pub fn new(source: S, sink: R) -> Self {
        Self {
            cache: TileCache::default(),
            source,
            sink,
            config: FetchConfig::default(),
            stores: BTreeMap::new(),
            uncached: Vec::new(),
            stats: Arc::new(FetcherStats::default()),
        }
    }

    pub fn with_config(mut self, config: FetchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cache(mut self, cache: TileCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    pub fn stats(&self) -> Arc<FetcherStats> {
        Arc::clone(&self.stats)
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    /// Stores on served tiles, ordered by id.
    pub fn stores(&self) -> impl Iterator<Item = &Store> {
        self.stores.values().map(|shown| &shown.store)
    }

    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    /// Marks the tiles of `range` dirty so the next viewport over them
    /// fetches again, and takes their stores off the layer. Returns the
    /// number of tiles forgotten.
    pub fn invalidate_range(&mut self, range: &TileRange) -> usize {
        let removed = self.cache.invalidate_range(range);
        let dropped = self.prune_stores();
        debug!(range = %range, removed, dropped, "Tiles invalidated");
        if dropped > 0 {
            self.render_stores();
        }
        removed
    }

    /// Evaluates a settled viewport.
    pub async fn on_viewport_changed(&mut self, viewport: &Viewport) -> FetchOutcome {
        self.stats.evaluations.fetch_add(1, Ordering::Relaxed);

        if viewport.zoom < self.config.min_fetch_zoom {
            trace!(
                zoom = viewport.zoom,
                min_fetch_zoom = self.config.min_fetch_zoom,
                "Below fetch zoom, skipping"
            );
            self.stats.below_min_zoom.fetch_add(1, Ordering::Relaxed);
            return FetchOutcome::BelowMinZoom;
        }

        if viewport.zoom > self.config.max_zoom {
            self.stats.rejected.fetch_add(1, Ordering::Relaxed);
            return FetchOutcome::Rejected(CoordError::InvalidZoom(viewport.zoom as i32));
        }

        let range = match viewport_to_tile_range(viewport, self.config.padding) {
            Ok(range) => range,
            Err(e) => {
                debug!(error = %e, "Viewport rejected");
                self.stats.rejected.fetch_add(1, Ordering::Relaxed);
                return FetchOutcome::Rejected(e);
            }
        };

        if range.tile_count() > self.cache.capacity() as u64 {
            return self.fetch_uncached(viewport.zoom, range).await;
        }

        let Some(missing) = self.cache.missing_range(&range) else {
            trace!(range = %range, "All tiles served");
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            let cleared = !self.uncached.is_empty();
            self.uncached.clear();
            if self.prune_stores() > 0 || cleared {
                self.render_stores();
            }
            return FetchOutcome::CacheHit(range);
        };

        self.stats.fetches.fetch_add(1, Ordering::Relaxed);
        let result = self.source.fetch_stores(viewport.zoom, &missing).await;
        match result {
            Ok(items) => {
                self.cache.mark_range_served(&missing);
                self.stats
                    .stores_received
                    .fetch_add(items.len() as u64, Ordering::Relaxed);

                // The response is authoritative for the refetched tiles
                self.stores.retain(|_, shown| !missing.contains(&shown.tile));
                for store in &items {
                    let shown = ShownStore {
                        tile: owning_tile(store, &missing),
                        store: store.clone(),
                    };
                    self.stores.insert(store.id.clone(), shown);
                }
                let dropped = self.prune_stores();
                self.uncached.clear();
                self.render_stores();

                debug!(
                    range = %missing,
                    tiles = missing.tile_count(),
                    items = items.len(),
                    dropped,
                    shown = self.stores.len(),
                    "Stores fetched"
                );
                FetchOutcome::Fetched {
                    range: missing,
                    items,
                }
            }
            Err(error) => self.fetch_failed(missing, error),
        }
    }

    /// Fetches a range too large for the cache without touching the cache.
    async fn fetch_uncached(&mut self, zoom: u8, range: TileRange) -> FetchOutcome {
        warn!(
            tiles = range.tile_count(),
            capacity = self.cache.capacity(),
            "Viewport range exceeds tile cache capacity, fetching without caching"
        );

        self.stats.fetches.fetch_add(1, Ordering::Relaxed);
        self.stats.uncached_fetches.fetch_add(1, Ordering::Relaxed);
        let result = self.source.fetch_stores(zoom, &range).await;
        match result {
            Ok(items) => {
                self.stats
                    .stores_received
                    .fetch_add(items.len() as u64, Ordering::Relaxed);
                self.uncached = items.clone();
                self.render_stores();
                FetchOutcome::Fetched { range, items }
            }
            Err(error) => self.fetch_failed(range, error),
        }
    }

    fn fetch_failed(&self, range: TileRange, error: FetchError) -> FetchOutcome {
        warn!(range = %range, error = %error, "Store fetch failed");
        self.stats.fetch_failures.fetch_add(1, Ordering::Relaxed);
        FetchOutcome::Failed { range, error }
    }

    /// Drops stores whose tile is no longer served. Returns how many.
    fn prune_stores(&mut self) -> usize {
        let before = self.stores.len();
        let cache = &mut self.cache;
        self.stores.retain(|_, shown| cache.has(&shown.tile));
        before - self.stores.len()
    }

    fn render_stores(&self) {
        let mut shown: BTreeMap<&str, &Store> = self
            .stores
            .values()
            .map(|shown| (shown.store.id.as_str(), &shown.store))
            .collect();
        for store in &self.uncached {
            shown.insert(store.id.as_str(), store);
        }

        let collection = FeatureCollection::new(shown.values().map(|s| s.to_feature()).collect());
        self.sink.render(STORE_LAYER, collection);
    }
}

/// Tile a store is shown for: the tile containing it, clamped into the range
/// it came back for. Stores with unusable coordinates go to the range's
/// first tile.
fn owning_tile(store: &Store, range: &TileRange) -> TileIndex {
    let fallback = TileIndex::new(range.zoom, range.min_x, range.min_y);
    let tile = point_to_tile(
        store.lat.clamp(MIN_LAT, MAX_LAT),
        store.lng.clamp(MIN_LON, MAX_LON),
        range.zoom,
    )
    .unwrap_or(fallback);

    TileIndex::new(
        range.zoom,
        tile.x.clamp(range.min_x, range.max_x),
        tile.y.clamp(range.min_y, range.max_y),
    )
}
