//! shopmap - Viewport-driven store fetching for map screens
//!
//! This library turns map camera movements into the smallest set of store
//! listing requests needed to keep the visible area populated:
//!
//! - [`coord`] maps geographic viewports onto Web Mercator tile ranges
//! - [`cache`] remembers which tiles have already been fetched
//! - [`viewport`] debounces camera-idle events and evaluates each settled
//!   viewport against the cache
//! - [`stores`] and [`route`] talk to the store backend and the OSRM router
//! - [`render`] hands GeoJSON layers to the map display
//!
//! # Example
//!
//! ```ignore
//! use shopmap::config::ConfigFile;
//! use shopmap::http::AsyncReqwestClient;
//! use shopmap::render::MemoryRenderSink;
//! use shopmap::stores::HttpStoreSource;
//! use shopmap::viewport::{MapSession, ViewportFetcher};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = ConfigFile::load()?;
//! let client = AsyncReqwestClient::with_timeout(config.store_source_config().timeout)?;
//! let source = HttpStoreSource::new(client, config.store_source_config());
//! let fetcher = ViewportFetcher::new(source, MemoryRenderSink::new())
//!     .with_config(config.fetch_config());
//!
//! let session = MapSession::spawn(fetcher, config.session_config(), CancellationToken::new());
//! session.camera_idle(viewport);
//! ```

pub mod cache;
pub mod config;
pub mod coord;
pub mod http;
pub mod logging;
pub mod render;
pub mod route;
pub mod stores;
pub mod viewport;

/// Version of the shopmap library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
