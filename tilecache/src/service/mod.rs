//! Request coordination.
//!
//! [`TileCacheService`] is the only component callers talk to. It resolves a
//! request against the disk cache and, when the policy allows, a single
//! shared upstream fetch per tile, then records the outcome in the activity
//! ledger.
//!
//! # Example
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
//! let policy = Policy::default().with_cache_folder("/var/cache/tiles");
//! let response = service.handle(&TileRequest::new("osm", 3, 2, 1), &policy).await?;
//! ```

pub mod coalesce;
mod coordinator;

pub use coalesce::{CoalescerStats, FetchCoalescer, FetchedTile, SharedFetch};
pub use coordinator::{TileCacheService, TileResponse};
