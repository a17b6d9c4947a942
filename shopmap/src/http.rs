//! HTTP client abstraction for testability.
//!
//! Remote collaborators (store listings, routing) talk to the network through
//! [`AsyncHttpClient`] so tests can substitute canned responses.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, trace, warn};

/// Default request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent string for HTTP requests.
const DEFAULT_USER_AGENT: &str = concat!("shopmap/", env!("CARGO_PKG_VERSION"));

/// Errors produced by the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// The client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    /// Connection, timeout or protocol failure.
    #[error("Request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body could not be read.
    #[error("Failed to read response: {0}")]
    Body(String),
}

/// Trait for asynchronous HTTP client operations.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request and returns the response body.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;

    /// Performs an HTTP POST request with a JSON body.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    /// * `json_body` - JSON body as a string
    /// * `bearer_token` - Token for the `Authorization: Bearer` header, if any
    fn post_json(
        &self,
        url: &str,
        json_body: &str,
        bearer_token: Option<&str>,
    ) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;
}

/// Async HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a client with the default 30 second timeout.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
    }

    /// Creates a client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    async fn read_response(
        response: reqwest::Response,
        method: &str,
        url: &str,
    ) -> Result<Vec<u8>, HttpError> {
        let status = response.status();
        debug!(method, url, status = status.as_u16(), "HTTP response received");

        if !status.is_success() {
            warn!(method, url, status = status.as_u16(), "HTTP error status");
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes.to_vec())
            }
            Err(e) => {
                warn!(url, error = %e, "Failed to read response body");
                Err(HttpError::Body(e.to_string()))
            }
        }
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        trace!(url, "HTTP GET request starting");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(
                url,
                error = %e,
                is_connect = e.is_connect(),
                is_timeout = e.is_timeout(),
                "HTTP request failed"
            );
            HttpError::Request(e.to_string())
        })?;

        Self::read_response(response, "GET", url).await
    }

    async fn post_json(
        &self,
        url: &str,
        json_body: &str,
        bearer_token: Option<&str>,
    ) -> Result<Vec<u8>, HttpError> {
        trace!(url, bytes = json_body.len(), "HTTP POST request starting");

        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(json_body.to_string());

        if let Some(token) = bearer_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| {
            warn!(
                url,
                error = %e,
                is_connect = e.is_connect(),
                is_timeout = e.is_timeout(),
                "HTTP POST failed"
            );
            HttpError::Request(e.to_string())
        })?;

        Self::read_response(response, "POST", url).await
    }
}
