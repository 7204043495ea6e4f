//! Upstream fetch error types.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while fetching a tile upstream.
///
/// `Clone` so one failed fetch can be handed to every request waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No complete response within the timeout
    #[error("Upstream did not respond within {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// Transport failure or non-success HTTP status
    #[error("HTTP error: {0}")]
    Http(String),

    /// No URL builder is registered for the server name
    #[error("Unknown tile server: {0}")]
    UnknownServer(String),
}

impl FetchError {
    /// Whether this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_timeout() {
        assert!(FetchError::Timeout(Duration::from_secs(1)).is_timeout());
        assert!(!FetchError::Http("HTTP 500".to_string()).is_timeout());
        assert!(!FetchError::UnknownServer("x".to_string()).is_timeout());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            FetchError::Timeout(Duration::from_millis(1500)).to_string(),
            "Upstream did not respond within 1.5s"
        );
        assert_eq!(
            FetchError::UnknownServer("topo".to_string()).to_string(),
            "Unknown tile server: topo"
        );
    }
}
