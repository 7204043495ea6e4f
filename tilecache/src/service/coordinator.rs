//! The tile request coordinator.

use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::coalesce::{
    self, FetchCoalescer, FetchedTile, InFlightGuard, Registration, SharedFetch,
};
use crate::cache::{map_to_path_with_extension, DiskStore};
use crate::ledger::{ActivityLedger, Outcome, RequestOutcome};
use crate::policy::Policy;
use crate::provider::UpstreamFetcher;
use crate::tile::{TileError, TileRequest};

/// Tile bytes, if any, plus the completed record of the request.
#[derive(Debug, Clone)]
pub struct TileResponse {
    /// Tile bytes for `CacheHit` and `Fetched`, `None` otherwise
    pub data: Option<Bytes>,
    /// The record appended to the ledger
    pub outcome: RequestOutcome,
}

/// Serves tile requests from the disk cache or a coalesced upstream fetch.
///
/// Safe to share between tasks; every method takes `&self`.
pub struct TileCacheService<F: UpstreamFetcher> {
    fetcher: Arc<F>,
    store: Arc<DiskStore>,
    ledger: Arc<ActivityLedger>,
    coalescer: Arc<FetchCoalescer>,
    next_id: AtomicU64,
}

impl<F: UpstreamFetcher> TileCacheService<F> {
    /// Create a service with its own ledger of the given capacity.
    pub fn new(fetcher: F, ledger_capacity: usize) -> Self {
        Self::with_ledger(fetcher, Arc::new(ActivityLedger::new(ledger_capacity)))
    }

    /// Create a service that records into an existing ledger.
    pub fn with_ledger(fetcher: F, ledger: Arc<ActivityLedger>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            store: Arc::new(DiskStore::new()),
            ledger,
            coalescer: Arc::new(FetchCoalescer::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// The activity ledger, for monitoring.
    pub fn ledger(&self) -> &Arc<ActivityLedger> {
        &self.ledger
    }

    /// The disk store, for its counters.
    pub fn store(&self) -> &DiskStore {
        &self.store
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn coalescer_stats(&self) -> coalesce::CoalescerStats {
        self.coalescer.stats()
    }

    /// Log the coalescer counters at info level.
    pub fn log_coalescer_stats(&self) {
        self.coalescer.log_stats();
    }

    /// Handle one tile request under the given policy.
    ///
    /// Every request that passes validation ends with exactly one record in
    /// the ledger, whatever its outcome. Upstream failures are outcomes, not
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns [`TileError`] for a structurally invalid request. Nothing is
    /// recorded and neither the disk nor the network is touched.
    pub async fn handle(
        &self,
        request: &TileRequest,
        policy: &Policy,
    ) -> Result<TileResponse, TileError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();
        let mut record = RequestOutcome::started(id, request);

        if !policy.enabled() {
            return Ok(self.finish(record, Outcome::Disabled, None, started));
        }

        let extension = self.fetcher.tile_extension(request.server());
        let path = map_to_path_with_extension(request, policy.cache_folder(), extension)?;
        let cacheable = policy.caches(request.class());

        if cacheable {
            if let Some(data) = read_cached(&self.store, &path).await {
                return Ok(self.finish(record, Outcome::CacheHit, Some(data), started));
            }
        }

        if policy.offline_mode() {
            return Ok(self.finish(record, Outcome::OfflineMiss, None, started));
        }

        let receiver = match self.coalescer.register(&path) {
            Registration::Leader(rx) => {
                self.spawn_fetch(request.clone(), path.clone(), cacheable, policy.timeout());
                rx
            }
            Registration::Follower(rx) => {
                record.mark_coalesced();
                rx
            }
        };

        match coalesce::wait(receiver).await {
            Ok(tile) => {
                let mut store_error = tile.store_error;
                // The fetch may have been led by a caller whose class is not cached
                if cacheable && !tile.from_disk && !tile.stored && store_error.is_none() {
                    store_error = store_fetched(&self.store, request, &path, &tile.data)
                        .await
                        .err();
                }
                if let Some(note) = store_error {
                    record.set_detail(note);
                }
                let outcome = if tile.from_disk {
                    Outcome::CacheHit
                } else {
                    Outcome::Fetched
                };
                Ok(self.finish(record, outcome, Some(tile.data), started))
            }
            Err(e) => {
                let outcome = if e.is_timeout() {
                    Outcome::Timeout
                } else {
                    Outcome::UpstreamError
                };
                record.set_detail(e.to_string());
                Ok(self.finish(record, outcome, None, started))
            }
        }
    }

    /// Start the shared fetch for a key this caller leads.
    ///
    /// The fetch owns everything it needs, so it keeps running if the
    /// leading caller is dropped.
    fn spawn_fetch(
        &self,
        request: TileRequest,
        path: PathBuf,
        cacheable: bool,
        timeout: Duration,
    ) {
        let fetcher = Arc::clone(&self.fetcher);
        let store = Arc::clone(&self.store);
        let guard = InFlightGuard::new(Arc::clone(&self.coalescer), path.clone());

        tokio::spawn(async move {
            let result =
                fetch_and_store(fetcher.as_ref(), &store, &request, &path, cacheable, timeout)
                    .await;
            guard.complete(result);
        });
    }

    fn finish(
        &self,
        mut record: RequestOutcome,
        outcome: Outcome,
        data: Option<Bytes>,
        started: Instant,
    ) -> TileResponse {
        let bytes = data.as_ref().map_or(0, Bytes::len);
        record.complete(outcome, bytes, started.elapsed());

        debug!(
            id = record.id(),
            server = record.server(),
            zoom = record.zoom(),
            x = record.x(),
            y = record.y(),
            outcome = %outcome,
            coalesced = record.is_coalesced(),
            duration_ms = record.duration_ms().unwrap_or(0),
            "Tile request complete"
        );

        self.ledger.append(record.clone());
        TileResponse {
            data,
            outcome: record,
        }
    }
}

/// Read a cached tile, treating unreadable files as misses.
async fn read_cached(store: &DiskStore, path: &Path) -> Option<Bytes> {
    match store.try_read(path).await {
        Ok(data) => data,
        Err(e) => {
            warn!(error = %e, "Cached tile unreadable, treating as miss");
            None
        }
    }
}

/// Body of a shared fetch.
///
/// Re-checks the disk first: a fetch for the same key may have finished
/// between the caller's miss and its registration.
async fn fetch_and_store<F: UpstreamFetcher>(
    fetcher: &F,
    store: &DiskStore,
    request: &TileRequest,
    path: &Path,
    cacheable: bool,
    timeout: Duration,
) -> SharedFetch {
    if cacheable {
        if let Some(data) = read_cached(store, path).await {
            return Ok(FetchedTile {
                data,
                from_disk: true,
                stored: false,
                store_error: None,
            });
        }
    }

    let data = fetcher.fetch(request, timeout).await?;

    let mut stored = false;
    let mut store_error = None;
    if cacheable {
        match store_fetched(store, request, path, &data).await {
            Ok(()) => stored = true,
            Err(note) => store_error = Some(note),
        }
    }

    Ok(FetchedTile {
        data,
        from_disk: false,
        stored,
        store_error,
    })
}

/// Best-effort cache write of a fetched tile. Returns the failure text.
async fn store_fetched(
    store: &DiskStore,
    request: &TileRequest,
    path: &Path,
    data: &[u8],
) -> Result<(), String> {
    store.write(path, data).await.map_err(|e| {
        warn!(tile = %request, error = %e, "Failed to cache tile, serving uncached");
        e.to_string()
    })
}
