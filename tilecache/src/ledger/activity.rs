//! Fixed-capacity ledger of recent request outcomes.

use parking_lot::RwLock;
use std::collections::VecDeque;

use super::outcome::{Outcome, RequestOutcome};

/// Number of outcomes kept when no capacity is configured.
pub const DEFAULT_LEDGER_CAPACITY: usize = 200;

/// Thread-safe ring buffer of completed request outcomes.
///
/// Entries are kept in the order requests completed (newest last). Once the
/// ledger is full, each append evicts the oldest entry. Writers hold the
/// lock only for a push and an optional pop; readers copy the buffer under
/// a shared lock, so a snapshot never contains a partially written entry.
///
/// Every append is stamped with a cursor that increases in append order.
/// Request ids follow start order instead, so incremental polling goes
/// through [`ActivityLedger::since`] with a cursor rather than an id.
#[derive(Debug)]
pub struct ActivityLedger {
    inner: RwLock<LedgerInner>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct LedgerInner {
    /// (cursor, outcome) pairs, oldest first
    entries: VecDeque<(u64, RequestOutcome)>,
    /// Cursor of the most recent append; 0 before the first
    cursor: u64,
}

/// Entries appended after a cursor, plus the cursor to poll from next.
#[derive(Debug, Clone, Default)]
pub struct LedgerPage {
    /// New entries, oldest first
    pub entries: Vec<RequestOutcome>,
    /// Pass this to the next [`ActivityLedger::since`] call
    pub cursor: u64,
}

/// Aggregate counts over the outcomes currently in the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LedgerStats {
    /// Entries counted
    pub total: usize,
    /// Served from disk
    pub cache_hits: usize,
    /// Fetched upstream
    pub fetched: usize,
    /// Refused by offline mode
    pub offline_misses: usize,
    /// Upstream timeouts
    pub timeouts: usize,
    /// Upstream failures
    pub upstream_errors: usize,
    /// Requests made while disabled
    pub disabled: usize,
    /// Requests that joined another request's fetch
    pub coalesced: usize,
    /// Mean duration of counted requests in milliseconds
    pub avg_duration_ms: f64,
}

impl LedgerStats {
    /// Count for one outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::CacheHit => self.cache_hits,
            Outcome::Fetched => self.fetched,
            Outcome::OfflineMiss => self.offline_misses,
            Outcome::Timeout => self.timeouts,
            Outcome::UpstreamError => self.upstream_errors,
            Outcome::Disabled => self.disabled,
        }
    }

    /// Share of tile-returning requests served from disk (0.0 to 1.0).
    pub fn hit_ratio(&self) -> f64 {
        let served = self.cache_hits + self.fetched;
        if served == 0 {
            0.0
        } else {
            self.cache_hits as f64 / served as f64
        }
    }

    /// Share of requests that ended without a tile (0.0 to 1.0).
    pub fn failure_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.timeouts + self.upstream_errors + self.offline_misses) as f64
                / self.total as f64
        }
    }
}

impl ActivityLedger {
    /// Create a ledger holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: RwLock::new(LedgerInner {
                entries: VecDeque::with_capacity(capacity),
                cursor: 0,
            }),
            capacity,
        }
    }

    /// Append a completed outcome, evicting the oldest entry when full.
    pub fn append(&self, outcome: RequestOutcome) {
        let mut inner = self.inner.write();
        if inner.entries.len() == self.capacity {
            inner.entries.pop_front();
        }
        inner.cursor += 1;
        let cursor = inner.cursor;
        inner.entries.push_back((cursor, outcome));
    }

    /// Copy of all entries, oldest first.
    pub fn snapshot(&self) -> Vec<RequestOutcome> {
        self.inner
            .read()
            .entries
            .iter()
            .map(|(_, e)| e.clone())
            .collect()
    }

    /// Entries appended after `cursor`, oldest first.
    ///
    /// Start from 0 and feed each returned [`LedgerPage::cursor`] back in.
    /// Entries evicted between two polls are not returned.
    pub fn since(&self, cursor: u64) -> LedgerPage {
        let inner = self.inner.read();
        // Cursors increase along the buffer, so the new entries are a suffix
        let start = inner.entries.partition_point(|(seq, _)| *seq <= cursor);
        LedgerPage {
            entries: inner.entries.range(start..).map(|(_, e)| e.clone()).collect(),
            cursor: inner.cursor,
        }
    }

    /// Cursor of the most recent append (0 if nothing was appended yet).
    pub fn cursor(&self) -> u64 {
        self.inner.read().cursor
    }

    /// The most recently appended entry.
    pub fn latest(&self) -> Option<RequestOutcome> {
        self.inner.read().entries.back().map(|(_, e)| e.clone())
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Maximum number of entries held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remove all entries. The cursor keeps counting.
    pub fn clear(&self) {
        self.inner.write().entries.clear();
    }

    /// Aggregate counts over the current entries.
    pub fn stats(&self) -> LedgerStats {
        let inner = self.inner.read();
        let mut stats = LedgerStats::default();
        let mut total_ms: u64 = 0;

        for (_, entry) in inner.entries.iter() {
            stats.total += 1;
            match entry.outcome() {
                Some(Outcome::CacheHit) => stats.cache_hits += 1,
                Some(Outcome::Fetched) => stats.fetched += 1,
                Some(Outcome::OfflineMiss) => stats.offline_misses += 1,
                Some(Outcome::Timeout) => stats.timeouts += 1,
                Some(Outcome::UpstreamError) => stats.upstream_errors += 1,
                Some(Outcome::Disabled) => stats.disabled += 1,
                None => {}
            }
            if entry.is_coalesced() {
                stats.coalesced += 1;
            }
            total_ms = total_ms.saturating_add(entry.duration_ms().unwrap_or(0));
        }

        if stats.total > 0 {
            stats.avg_duration_ms = total_ms as f64 / stats.total as f64;
        }
        stats
    }
}

impl Default for ActivityLedger {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_CAPACITY)
    }
}
