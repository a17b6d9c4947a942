//! Fetch and session settings.

use std::time::Duration;

use crate::coord::MAX_ZOOM;

/// Lowest zoom at which stores are fetched.
pub const DEFAULT_MIN_FETCH_ZOOM: u8 = 14;

/// Tiles added around the visible range on every side.
pub const DEFAULT_TILE_PADDING: u32 = 1;

/// Quiet period after the last camera-idle event before evaluating.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Settings for [`ViewportFetcher`](super::ViewportFetcher).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchConfig {
    /// Viewports below this zoom are ignored.
    pub min_fetch_zoom: u8,
    /// Padding in tiles around the visible range.
    pub padding: u32,
    /// Viewports above this zoom are rejected.
    pub max_zoom: u8,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            min_fetch_zoom: DEFAULT_MIN_FETCH_ZOOM,
            padding: DEFAULT_TILE_PADDING,
            max_zoom: MAX_ZOOM,
        }
    }
}

/// Settings for [`MapSession`](super::MapSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub debounce: Duration,
}

impl SessionConfig {
    pub fn with_debounce(debounce: Duration) -> Self {
        Self { debounce }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}
