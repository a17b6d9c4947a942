//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (init, show, path)
//! - [`fetch`] - One viewport evaluation against the store endpoint
//! - [`replay`] - Recorded camera events through a debounced session
//! - [`route`] - OSRM driving route
//! - [`tile`] - Tile and tile range math

pub mod common;
pub mod config;
pub mod fetch;
pub mod replay;
pub mod route;
pub mod tile;
