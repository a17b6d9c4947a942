//! Viewport-driven store fetching.
//!
//! The map display reports a [`Viewport`](crate::coord::Viewport) whenever the
//! camera comes to rest. [`MapSession`] debounces those reports and hands the
//! survivor to a [`ViewportFetcher`], which decides whether anything needs to
//! be fetched:
//!
//! ```text
//! camera idle ──► MapSession (trailing debounce) ──► ViewportFetcher
//!                                                      │ zoom gate
//!                                                      │ viewport → padded TileRange
//!                                                      │ TileCache::missing_range
//!                                                      ▼
//!                                          StoreSource ──► RenderSink("store-layer")
//! ```

mod config;
mod fetcher;
mod session;

pub use config::{
    FetchConfig, SessionConfig, DEFAULT_DEBOUNCE, DEFAULT_MIN_FETCH_ZOOM, DEFAULT_TILE_PADDING,
};
pub use fetcher::{FetchOutcome, FetcherStats, FetcherStatsSnapshot, ViewportFetcher};
pub use session::{MapSession, MapSessionHandle, SessionStats, SessionStatsSnapshot};

#[cfg(test)]
pub(crate) mod test_support;
