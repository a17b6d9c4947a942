//! Store sources.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::error::FetchError;
use super::types::Store;
use crate::coord::TileRange;
use crate::http::{AsyncHttpClient, DEFAULT_HTTP_TIMEOUT_SECS};

/// Supplies the stores that lie inside a tile range.
pub trait StoreSource: Send + Sync {
    /// Fetches the stores for `range` at `zoom`.
    fn fetch_stores(
        &self,
        zoom: u8,
        range: &TileRange,
    ) -> impl Future<Output = Result<Vec<Store>, FetchError>> + Send;
}

impl<T: StoreSource> StoreSource for Arc<T> {
    fn fetch_stores(
        &self,
        zoom: u8,
        range: &TileRange,
    ) -> impl Future<Output = Result<Vec<Store>, FetchError>> + Send {
        (**self).fetch_stores(zoom, range)
    }
}

/// Connection settings for the store backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSourceConfig {
    /// Full URL of the listing endpoint. Empty means unset.
    pub endpoint: String,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub bearer_token: Option<String>,
    pub timeout: Duration,
}

impl StoreSourceConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }
}

impl Default for StoreSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            bearer_token: None,
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

#[derive(Serialize)]
struct StoreQuery {
    zoom: u8,
    tile_range: RangeBody,
}

#[derive(Serialize)]
struct RangeBody {
    min_x: u32,
    max_x: u32,
    min_y: u32,
    max_y: u32,
}

#[derive(Deserialize)]
struct StoreEnvelope {
    data: StoreData,
}

#[derive(Deserialize)]
struct StoreData {
    #[serde(default)]
    items: Vec<Store>,
}

/// Store source backed by the HTTP listing endpoint.
pub struct HttpStoreSource<C: AsyncHttpClient> {
    client: C,
    config: StoreSourceConfig,
}

impl<C: AsyncHttpClient> HttpStoreSource<C> {
    pub fn new(client: C, config: StoreSourceConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &StoreSourceConfig {
        &self.config
    }

    fn request_body(zoom: u8, range: &TileRange) -> Result<String, FetchError> {
        let query = StoreQuery {
            zoom,
            tile_range: RangeBody {
                min_x: range.min_x,
                max_x: range.max_x,
                min_y: range.min_y,
                max_y: range.max_y,
            },
        };
        serde_json::to_string(&query).map_err(|e| FetchError::Json(e.to_string()))
    }

    fn parse_response(bytes: &[u8]) -> Result<Vec<Store>, FetchError> {
        let envelope: StoreEnvelope =
            serde_json::from_slice(bytes).map_err(|e| FetchError::Json(e.to_string()))?;
        Ok(envelope.data.items)
    }
}

impl<C: AsyncHttpClient> StoreSource for HttpStoreSource<C> {
    async fn fetch_stores(&self, zoom: u8, range: &TileRange) -> Result<Vec<Store>, FetchError> {
        if !self.config.is_configured() {
            return Err(FetchError::NotConfigured);
        }

        let body = Self::request_body(zoom, range)?;
        trace!(endpoint = %self.config.endpoint, %body, "Requesting stores");

        let bytes = self
            .client
            .post_json(
                &self.config.endpoint,
                &body,
                self.config.bearer_token.as_deref(),
            )
            .await?;

        let stores = Self::parse_response(&bytes)?;
        debug!(
            zoom,
            tiles = range.tile_count(),
            stores = stores.len(),
            "Store listing received"
        );
        Ok(stores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::MockAsyncHttpClient;
    use crate::http::HttpError;

    const ENDPOINT: &str = "https://stores.local/api/v1/stores/tile";

    fn range() -> TileRange {
        TileRange {
            zoom: 16,
            min_x: 52191,
            max_x: 52196,
            min_y: 30793,
            max_y: 30797,
        }
    }

    #[tokio::test]
    async fn test_posts_zoom_and_range() {
        let mock = MockAsyncHttpClient::ok(r#"{"data": {"items": []}}"#);
        let source = HttpStoreSource::new(
            mock.clone(),
            StoreSourceConfig::new(ENDPOINT).with_bearer_token("secret"),
        );

        let stores = source.fetch_stores(16, &range()).await.unwrap();
        assert!(stores.is_empty());

        let requests = mock.recorded();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].url, ENDPOINT);
        assert_eq!(requests[0].bearer_token.as_deref(), Some("secret"));

        let body: serde_json::Value =
            serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "zoom": 16,
                "tile_range": {"min_x": 52191, "max_x": 52196, "min_y": 30793, "max_y": 30797}
            })
        );
    }

    #[tokio::test]
    async fn test_without_token_sends_no_auth() {
        let mock = MockAsyncHttpClient::ok(r#"{"data": {"items": []}}"#);
        let source = HttpStoreSource::new(mock.clone(), StoreSourceConfig::new(ENDPOINT));

        source.fetch_stores(16, &range()).await.unwrap();

        assert_eq!(mock.recorded()[0].bearer_token, None);
    }

    #[tokio::test]
    async fn test_parses_items() {
        let mock = MockAsyncHttpClient::ok(
            r#"{"data": {"items": [
                {"id": "a", "name": "Shop A", "lat": 10.77, "lng": 106.70},
                {"id": 2, "lat": 10.78, "lng": 106.71, "phone": "028"}
            ]}}"#,
        );
        let source = HttpStoreSource::new(mock, StoreSourceConfig::new(ENDPOINT));

        let stores = source.fetch_stores(16, &range()).await.unwrap();

        assert_eq!(stores.len(), 2);
        assert_eq!(stores[0].name, "Shop A");
        assert_eq!(stores[1].id, "2");
        assert_eq!(stores[1].extra["phone"], "028");
    }

    #[tokio::test]
    async fn test_missing_items_is_empty() {
        let mock = MockAsyncHttpClient::ok(r#"{"data": {}}"#);
        let source = HttpStoreSource::new(mock, StoreSourceConfig::new(ENDPOINT));

        assert!(source.fetch_stores(16, &range()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let mock = MockAsyncHttpClient::ok("<html>502</html>");
        let source = HttpStoreSource::new(mock, StoreSourceConfig::new(ENDPOINT));

        let result = source.fetch_stores(16, &range()).await;
        assert!(matches!(result, Err(FetchError::Json(_))));
    }

    #[tokio::test]
    async fn test_http_error_propagates() {
        let mock = MockAsyncHttpClient::err(HttpError::Status {
            status: 401,
            url: ENDPOINT.to_string(),
        });
        let source = HttpStoreSource::new(mock, StoreSourceConfig::new(ENDPOINT));

        let result = source.fetch_stores(16, &range()).await;
        assert!(matches!(
            result,
            Err(FetchError::Http(HttpError::Status { status: 401, .. }))
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_endpoint_does_not_send() {
        let mock = MockAsyncHttpClient::ok(r#"{"data": {"items": []}}"#);
        let source = HttpStoreSource::new(mock.clone(), StoreSourceConfig::default());

        let result = source.fetch_stores(16, &range()).await;

        assert_eq!(result.unwrap_err(), FetchError::NotConfigured);
        assert!(mock.recorded().is_empty());
    }
}
