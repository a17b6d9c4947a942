//! Remote store listings.
//!
//! The store backend answers "which stores lie inside this tile range" with
//! an authenticated JSON POST:
//!
//! ```text
//! POST {endpoint}
//! Authorization: Bearer <token>
//! {"zoom": 16, "tile_range": {"min_x": 52191, "max_x": 52196, "min_y": 30793, "max_y": 30797}}
//!
//! 200 OK
//! {"data": {"items": [{"id": "shop-1", "name": "...", "lat": 10.77, "lng": 106.70, ...}]}}
//! ```
//!
//! [`StoreSource`] is the seam the viewport fetcher depends on;
//! [`HttpStoreSource`] is the production implementation.

mod error;
mod source;
mod types;

pub use error::FetchError;
pub use source::{HttpStoreSource, StoreSource, StoreSourceConfig};
pub use types::Store;
