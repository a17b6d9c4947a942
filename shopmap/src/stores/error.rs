//! Error types for store fetching.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur while fetching store listings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// No endpoint is configured.
    #[error("Store endpoint is not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("Store request failed: {0}")]
    Http(#[from] HttpError),

    /// Response body was not the expected JSON envelope.
    #[error("Failed to parse store response: {0}")]
    Json(String),
}
