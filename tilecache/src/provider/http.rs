//! HTTP client abstraction for testability

use super::types::FetchError;
use bytes::Bytes;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Trait for asynchronous HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync + 'static {
    /// Performs an async HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body or an error. Non-success status codes are errors.
    fn get(&self, url: &str) -> impl Future<Output = Result<Bytes, FetchError>> + Send;
}

/// User-Agent sent with every upstream request.
///
/// Public tile servers such as OpenStreetMap's reject anonymous clients.
const DEFAULT_USER_AGENT: &str = concat!("tilecache/", env!("CARGO_PKG_VERSION"));

/// Time allowed to establish a TCP/TLS connection.
///
/// The overall request budget is applied per call by the fetcher.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Async HTTP client implementation using reqwest.
///
/// Keeps a connection pool so repeated tile requests to the same host reuse
/// warm connections.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new AsyncReqwestClient with the default User-Agent.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Creates a new AsyncReqwestClient with a custom User-Agent.
    pub fn with_user_agent(user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(CONNECT_TIMEOUT)
            // Connection pooling - keep connections alive across tile requests
            .pool_max_idle_per_host(32)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| FetchError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Bytes, FetchError> {
        trace!(url = url, "HTTP GET request starting");

        let response = match self.client.get(url).send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(FetchError::Http(format!("Request failed: {}", e)));
            }
        };

        // Check HTTP status
        if !response.status().is_success() {
            warn!(
                url = url,
                status = response.status().as_u16(),
                "HTTP error status"
            );
            return Err(FetchError::Http(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        // Read response body
        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes)
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(FetchError::Http(format!("Failed to read response: {}", e)))
            }
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Mock async HTTP client for testing.
    ///
    /// Returns a fixed response after an optional delay and records every
    /// requested URL.
    #[derive(Clone)]
    pub struct MockAsyncHttpClient {
        pub response: Result<Bytes, FetchError>,
        pub delay: Duration,
        pub calls: Arc<AtomicUsize>,
        pub urls: Arc<Mutex<Vec<String>>>,
    }

    impl MockAsyncHttpClient {
        pub fn ok(data: &'static [u8]) -> Self {
            Self::with_response(Ok(Bytes::from_static(data)))
        }

        pub fn with_response(response: Result<Bytes, FetchError>) -> Self {
            Self {
                response,
                delay: Duration::ZERO,
                calls: Arc::new(AtomicUsize::new(0)),
                urls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl AsyncHttpClient for MockAsyncHttpClient {
        async fn get(&self, url: &str) -> Result<Bytes, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().push(url.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.response.clone()
        }
    }

    #[tokio::test]
    async fn test_mock_async_client_success() {
        let mock = MockAsyncHttpClient::ok(&[1, 2, 3, 4]);

        let result = mock.get("http://example.com/1/0/0.png").await;

        assert_eq!(result.unwrap().as_ref(), &[1, 2, 3, 4]);
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.urls.lock()[0], "http://example.com/1/0/0.png");
    }

    #[tokio::test]
    async fn test_mock_async_client_error() {
        let mock =
            MockAsyncHttpClient::with_response(Err(FetchError::Http("Test error".to_string())));

        let result = mock.get("http://example.com").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(AsyncReqwestClient::new().is_ok());
    }

    #[test]
    fn test_default_user_agent_names_crate() {
        assert!(DEFAULT_USER_AGENT.starts_with("tilecache/"));
    }
}
