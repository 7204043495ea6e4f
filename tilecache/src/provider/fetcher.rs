//! Bounded-time upstream tile fetching.

use bytes::Bytes;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use super::http::AsyncHttpClient;
use super::registry::TileServerRegistry;
use super::types::FetchError;
use crate::cache::DEFAULT_TILE_EXTENSION;
use crate::tile::TileRequest;

/// Fetches tile bytes from the upstream server of a request.
///
/// Implementations make exactly one attempt per call; retry policy belongs
/// to the caller.
pub trait UpstreamFetcher: Send + Sync + 'static {
    /// Fetch a tile, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// * [`FetchError::Timeout`] - no complete response within `timeout`
    /// * [`FetchError::Http`] - transport failure or non-success status
    /// * [`FetchError::UnknownServer`] - the server name is not configured
    fn fetch(
        &self,
        request: &TileRequest,
        timeout: Duration,
    ) -> impl Future<Output = Result<Bytes, FetchError>> + Send;

    /// File extension under which tiles of `server` are cached.
    fn tile_extension(&self, _server: &str) -> &str {
        DEFAULT_TILE_EXTENSION
    }
}

/// Upstream fetcher that resolves URLs through a [`TileServerRegistry`].
pub struct HttpFetcher<C: AsyncHttpClient> {
    client: C,
    registry: TileServerRegistry,
}

impl<C: AsyncHttpClient> HttpFetcher<C> {
    /// Creates a new fetcher.
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client for making requests
    /// * `registry` - Servers this fetcher can reach
    pub fn new(client: C, registry: TileServerRegistry) -> Self {
        Self { client, registry }
    }

    /// The servers this fetcher can reach.
    pub fn registry(&self) -> &TileServerRegistry {
        &self.registry
    }
}

impl<C: AsyncHttpClient> UpstreamFetcher for HttpFetcher<C> {
    async fn fetch(&self, request: &TileRequest, timeout: Duration) -> Result<Bytes, FetchError> {
        let server = self
            .registry
            .get(request.server())
            .ok_or_else(|| FetchError::UnknownServer(request.server().to_string()))?;
        let url = server.url_for(request);

        debug!(
            tile = %request,
            url = %url,
            timeout_ms = timeout.as_millis() as u64,
            "Fetching tile upstream"
        );

        // Dropping the request future on expiry releases its connection
        match tokio::time::timeout(timeout, self.client.get(&url)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    tile = %request,
                    url = %url,
                    timeout_ms = timeout.as_millis() as u64,
                    "Upstream fetch timed out"
                );
                Err(FetchError::Timeout(timeout))
            }
        }
    }

    fn tile_extension(&self, server: &str) -> &str {
        self.registry.format_for(server)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::http::tests::MockAsyncHttpClient;
    use crate::provider::TileServer;

    fn registry() -> TileServerRegistry {
        let mut registry = TileServerRegistry::new();
        registry.register(
            TileServer::from_template("osm", "https://tile.example/{z}/{x}/{y}{r}.png"),
        );
        registry.register(
            TileServer::from_template("sat", "https://sat.example/{z}/{x}/{y}.jpg")
                .with_format("jpg"),
        );
        registry
    }

    #[tokio::test]
    async fn test_fetch_uses_server_template() {
        let client = MockAsyncHttpClient::ok(b"tile");
        let fetcher = HttpFetcher::new(client.clone(), registry());

        let data = fetcher
            .fetch(
                &TileRequest::new("osm", 3, 2, 1).with_retina(true),
                Duration::from_secs(5),
            )
            .await
            .unwrap();

        assert_eq!(data.as_ref(), b"tile");
        assert_eq!(client.urls.lock()[0], "https://tile.example/3/2/1@2x.png");
    }

    #[tokio::test]
    async fn test_fetch_unknown_server_does_not_call_network() {
        let client = MockAsyncHttpClient::ok(b"tile");
        let fetcher = HttpFetcher::new(client.clone(), registry());

        let result = fetcher
            .fetch(&TileRequest::new("nope", 1, 0, 0), Duration::from_secs(5))
            .await;

        assert_eq!(result, Err(FetchError::UnknownServer("nope".to_string())));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_passes_through_http_error() {
        let client =
            MockAsyncHttpClient::with_response(Err(FetchError::Http("HTTP 404".to_string())));
        let fetcher = HttpFetcher::new(client, registry());

        let result = fetcher
            .fetch(&TileRequest::new("osm", 1, 0, 0), Duration::from_secs(5))
            .await;

        assert_eq!(result, Err(FetchError::Http("HTTP 404".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_times_out() {
        let client = MockAsyncHttpClient::ok(b"late").with_delay(Duration::from_secs(60));
        let fetcher = HttpFetcher::new(client, registry());

        let result = fetcher
            .fetch(&TileRequest::new("osm", 1, 0, 0), Duration::from_secs(1))
            .await;

        assert_eq!(result, Err(FetchError::Timeout(Duration::from_secs(1))));
    }

    #[test]
    fn test_tile_extension_from_registry() {
        let fetcher = HttpFetcher::new(MockAsyncHttpClient::ok(b""), registry());

        assert_eq!(fetcher.tile_extension("sat"), "jpg");
        assert_eq!(fetcher.tile_extension("osm"), "png");
        assert_eq!(fetcher.tile_extension("unknown"), "png");
    }
}
