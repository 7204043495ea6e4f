//! Upstream tile servers.
//!
//! Resolves a [`TileRequest`](crate::tile::TileRequest) to an upstream URL
//! through a per-server [`UrlBuilder`] and fetches it with a strict timeout.
//!
//! # Architecture
//!
//! ```text
//! TileCacheService ──► UpstreamFetcher ──► TileServerRegistry ──► UrlBuilder
//!                            │                                       │
//!                            │                                  build_url()
//!                            ▼                                       │
//!                      AsyncHttpClient ◄─────────── url ─────────────┘
//! ```

mod fetcher;
mod http;
mod registry;
mod template;
mod types;

pub use fetcher::{HttpFetcher, UpstreamFetcher};
pub use http::{AsyncHttpClient, AsyncReqwestClient};
pub use registry::{TileServer, TileServerRegistry, DEFAULT_OSM_URL};
pub use template::{UrlBuilder, UrlTemplate};
pub use types::FetchError;

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
