//! Upstream fetch coalescing.
//!
//! When several requests miss the cache for the same tile at once, only the
//! first starts an upstream fetch. Every other request subscribes to that
//! fetch and receives the same result.
//!
//! # Architecture
//!
//! ```text
//! Request A ─┐
//!            │                              spawned
//! Request B ─┼──► FetchCoalescer ─────────► fetch task
//!            │        │                         │
//! Request C ─┘        │                         │
//!                     ▼                         ▼
//!               [A, B, C all             [one upstream GET]
//!                receive same                   │
//!                result]◄───────────────────────┘
//! ```
//!
//! The fetch runs in its own task and every caller, including the one that
//! started it, waits on a broadcast receiver. Abandoning any caller therefore
//! never cancels the fetch for the others.
//!
//! # Implementation
//!
//! Uses `DashMap` so the insert-or-join step holds a single shard lock and
//! nothing is held across an await. Statistics use atomic counters.

use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::provider::FetchError;

/// Tile produced by a shared fetch.
#[derive(Clone, Debug)]
pub struct FetchedTile {
    /// Tile bytes, cheap to clone for every waiter
    pub data: Bytes,
    /// Found on disk when the fetch task re-checked the cache
    pub from_disk: bool,
    /// Written to the cache by the fetch task
    pub stored: bool,
    /// Failed cache write, if any. The tile is still usable.
    pub store_error: Option<String>,
}

/// Result broadcast to every waiter of a shared fetch.
pub type SharedFetch = Result<FetchedTile, FetchError>;

/// Statistics for monitoring coalescing effectiveness.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CoalescerStats {
    /// Total registrations
    pub total_requests: u64,
    /// Registrations that joined an in-flight fetch
    pub coalesced_requests: u64,
    /// Registrations that started a fetch
    pub new_requests: u64,
}

impl CoalescerStats {
    /// Returns the coalescing ratio (0.0 to 1.0)
    pub fn coalescing_ratio(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.coalesced_requests as f64 / self.total_requests as f64
        }
    }
}

/// Result of registering interest in a tile.
pub enum Registration {
    /// No fetch was in flight. The caller must start one and complete it.
    Leader(broadcast::Receiver<SharedFetch>),
    /// A fetch is already in flight; wait on the receiver.
    Follower(broadcast::Receiver<SharedFetch>),
}

impl Registration {
    /// Whether this registration must start the fetch.
    pub fn is_leader(&self) -> bool {
        matches!(self, Self::Leader(_))
    }

    /// The receiver to wait on, regardless of role.
    pub fn into_receiver(self) -> broadcast::Receiver<SharedFetch> {
        match self {
            Self::Leader(rx) | Self::Follower(rx) => rx,
        }
    }
}

/// Tracks in-flight upstream fetches, keyed by cache path.
pub struct FetchCoalescer {
    in_flight: DashMap<PathBuf, broadcast::Sender<SharedFetch>>,
    total_requests: AtomicU64,
    coalesced_requests: AtomicU64,
    new_requests: AtomicU64,
}

impl FetchCoalescer {
    pub fn new() -> Self {
        Self {
            in_flight: DashMap::new(),
            total_requests: AtomicU64::new(0),
            coalesced_requests: AtomicU64::new(0),
            new_requests: AtomicU64::new(0),
        }
    }

    /// Register interest in the tile stored at `key`.
    ///
    /// Exactly one concurrent caller per key becomes the leader. The leader's
    /// receiver is created together with the channel, so it cannot miss the
    /// result even if the fetch finishes before the leader starts waiting.
    pub fn register(&self, key: &Path) -> Registration {
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        match self.in_flight.entry(key.to_path_buf()) {
            Entry::Occupied(entry) => {
                let rx = entry.get().subscribe();
                self.coalesced_requests.fetch_add(1, Ordering::Relaxed);
                debug!(
                    key = %key.display(),
                    waiters = entry.get().receiver_count(),
                    "Joining in-flight fetch"
                );
                Registration::Follower(rx)
            }
            Entry::Vacant(entry) => {
                // One message is ever sent per channel
                let (tx, rx) = broadcast::channel(1);
                entry.insert(tx);
                self.new_requests.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key.display(), "Starting new fetch");
                Registration::Leader(rx)
            }
        }
    }

    /// Remove the key and broadcast the result to all waiters.
    ///
    /// Returns the number of waiters that were still listening.
    pub fn complete(&self, key: &Path, result: SharedFetch) -> usize {
        match self.in_flight.remove(key) {
            Some((_, tx)) => {
                // Send fails only when every waiter has gone away
                let waiters = tx.send(result).unwrap_or(0);
                debug!(key = %key.display(), waiters, "Broadcast shared fetch result");
                waiters
            }
            None => 0,
        }
    }

    /// Remove the key without a result.
    ///
    /// Dropping the sender closes the channel, so waiters observe an error
    /// instead of hanging.
    pub fn cancel(&self, key: &Path) {
        if self.in_flight.remove(key).is_some() {
            debug!(key = %key.display(), "Cancelled in-flight fetch");
        }
    }

    /// Returns the number of fetches currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns a snapshot of the current statistics.
    pub fn stats(&self) -> CoalescerStats {
        CoalescerStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            coalesced_requests: self.coalesced_requests.load(Ordering::Relaxed),
            new_requests: self.new_requests.load(Ordering::Relaxed),
        }
    }

    /// Logs current statistics.
    pub fn log_stats(&self) {
        let stats = self.stats();
        info!(
            total_requests = stats.total_requests,
            coalesced = stats.coalesced_requests,
            new_requests = stats.new_requests,
            in_flight = self.in_flight_count(),
            coalescing_ratio = format!("{:.1}%", stats.coalescing_ratio() * 100.0),
            "Fetch coalescing statistics"
        );
    }
}

impl Default for FetchCoalescer {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for the result of a shared fetch.
///
/// A channel closed without a result (the fetch task panicked or was
/// cancelled) is reported as an upstream failure.
pub async fn wait(mut rx: broadcast::Receiver<SharedFetch>) -> SharedFetch {
    rx.recv()
        .await
        .unwrap_or_else(|_| Err(FetchError::Http("shared fetch ended without a result".into())))
}

/// Leader's claim on an in-flight key.
///
/// Completing the guard broadcasts the result. Dropping it without completing
/// (task panic or abort) cancels the key so waiters are released and later
/// requests can start a fresh fetch.
pub(crate) struct InFlightGuard {
    coalescer: Arc<FetchCoalescer>,
    key: Option<PathBuf>,
}

impl InFlightGuard {
    pub(crate) fn new(coalescer: Arc<FetchCoalescer>, key: PathBuf) -> Self {
        Self {
            coalescer,
            key: Some(key),
        }
    }

    pub(crate) fn complete(mut self, result: SharedFetch) -> usize {
        match self.key.take() {
            Some(key) => self.coalescer.complete(&key, result),
            None => 0,
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.coalescer.cancel(&key);
        }
    }
}
