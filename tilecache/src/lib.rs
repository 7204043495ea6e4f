//! TileCache - disk-backed caching proxy for slippy-map tile servers
//!
//! This library sits between a map UI and one or more upstream tile servers.
//! Tiles are served from a local disk cache when present, fetched upstream
//! (at most once per tile at a time) when not, and every request outcome is
//! recorded in a bounded activity ledger for monitoring.
//!
//! # High-Level API
//!
//! The [`service`] module provides the request coordinator:
//!
//! ```ignore
//! use tilecache::policy::Policy;
//! use tilecache::provider::{AsyncReqwestClient, HttpFetcher, TileServerRegistry};
//! use tilecache::service::TileCacheService;
//! use tilecache::tile::TileRequest;
//!
//! let fetcher = HttpFetcher::new(AsyncReqwestClient::new()?, TileServerRegistry::with_defaults());
//! let service = TileCacheService::new(fetcher, 200);
//!
//! let response = service.handle(&TileRequest::new("osm", 3, 2, 1), &Policy::default()).await?;
//! println!("{}", response.outcome.outcome().map(|o| o.to_string()).unwrap_or_default());
//! ```

pub mod cache;
pub mod config;
pub mod ledger;
pub mod logging;
pub mod policy;
pub mod provider;
pub mod service;
pub mod tile;

/// Version of the TileCache library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
