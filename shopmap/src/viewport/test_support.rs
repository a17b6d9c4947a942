//! Shared fakes for viewport tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::coord::{tile_to_bounds, TileIndex, TileRange, Viewport};
use crate::http::HttpError;
use crate::stores::{FetchError, Store, StoreSource};

/// Viewport whose corners sit at the centers of the corner tiles of the
/// given block.
pub fn block_viewport(zoom: u8, min_x: u32, max_x: u32, min_y: u32, max_y: u32) -> Viewport {
    let center = |x, y| tile_to_bounds(x, y, zoom).center();
    Viewport::new(
        center(min_x, min_y),
        center(max_x, min_y),
        center(min_x, max_y),
        center(max_x, max_y),
        zoom as i32,
    )
    .unwrap()
}

/// Store source that records its calls and answers with one store at the
/// center of the range's first tile, or with a fixed list when one is set.
#[derive(Default)]
pub struct MockStoreSource {
    calls: Mutex<Vec<(u8, TileRange)>>,
    failing: AtomicBool,
    delay: Mutex<Duration>,
    fixed_stores: Mutex<Option<Vec<Store>>>,
}

impl MockStoreSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        let source = Self::default();
        *source.delay.lock().unwrap() = delay;
        source
    }

    pub fn calls(&self) -> Vec<(u8, TileRange)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_fixed_store(&self, store: Store) {
        self.set_fixed_stores(vec![store]);
    }

    pub fn set_fixed_stores(&self, stores: Vec<Store>) {
        *self.fixed_stores.lock().unwrap() = Some(stores);
    }
}

impl StoreSource for MockStoreSource {
    async fn fetch_stores(&self, zoom: u8, range: &TileRange) -> Result<Vec<Store>, FetchError> {
        self.calls.lock().unwrap().push((zoom, *range));

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Http(HttpError::Request(
                "connection refused".to_string(),
            )));
        }

        let fixed = self.fixed_stores.lock().unwrap().clone();
        if let Some(stores) = fixed {
            return Ok(stores);
        }

        let tile = TileIndex::new(zoom, range.min_x, range.min_y);
        let center = tile_to_bounds(tile.x, tile.y, zoom).center();
        Ok(vec![Store::new(
            tile.to_string(),
            "Mock store",
            center.lat,
            center.lng,
        )])
    }
}
