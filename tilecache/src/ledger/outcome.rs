//! Request outcome records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::tile::{TileClass, TileRequest};

/// Terminal state of a tile request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    /// Served from the disk cache
    CacheHit,
    /// Fetched from the upstream server
    Fetched,
    /// Not cached and offline mode forbids fetching
    OfflineMiss,
    /// Upstream did not answer within the timeout
    Timeout,
    /// Upstream returned an error or could not be reached
    UpstreamError,
    /// Caching is turned off
    Disabled,
}

impl Outcome {
    /// All outcomes, in display order.
    pub const ALL: [Outcome; 6] = [
        Outcome::CacheHit,
        Outcome::Fetched,
        Outcome::OfflineMiss,
        Outcome::Timeout,
        Outcome::UpstreamError,
        Outcome::Disabled,
    ];

    /// Whether tile bytes were returned.
    pub fn has_tile(&self) -> bool {
        matches!(self, Outcome::CacheHit | Outcome::Fetched)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::CacheHit => "cache hit",
            Outcome::Fetched => "fetched",
            Outcome::OfflineMiss => "offline miss",
            Outcome::Timeout => "timeout",
            Outcome::UpstreamError => "upstream error",
            Outcome::Disabled => "disabled",
        };
        write!(f, "{}", label)
    }
}

/// Record of one tile request.
///
/// Created when the request starts with no outcome, completed exactly once,
/// then appended to the ledger where it is never changed again.
/// `completed_utc` and `duration_ms` are set together on completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestOutcome {
    id: u64,
    received_utc: DateTime<Utc>,
    completed_utc: Option<DateTime<Utc>>,
    duration_ms: Option<u64>,
    server: String,
    class: TileClass,
    zoom: u8,
    x: u32,
    y: u32,
    retina: bool,
    outcome: Option<Outcome>,
    coalesced: bool,
    bytes: usize,
    detail: Option<String>,
}

impl RequestOutcome {
    /// Start a record for a request received now.
    pub fn started(id: u64, request: &TileRequest) -> Self {
        Self::started_at(id, request, Utc::now())
    }

    /// Start a record with an explicit receive time.
    pub fn started_at(id: u64, request: &TileRequest, received_utc: DateTime<Utc>) -> Self {
        Self {
            id,
            received_utc,
            completed_utc: None,
            duration_ms: None,
            server: request.server().to_string(),
            class: request.class(),
            zoom: request.zoom(),
            x: request.x(),
            y: request.y(),
            retina: request.retina(),
            outcome: None,
            coalesced: false,
            bytes: 0,
            detail: None,
        }
    }

    /// Move the record to its terminal state.
    ///
    /// `elapsed` is measured on a monotonic clock; the completion timestamp is
    /// derived from it so `completed_utc - received_utc == duration_ms`
    /// always holds. Completing an already completed record has no effect.
    pub(crate) fn complete(&mut self, outcome: Outcome, bytes: usize, elapsed: Duration) {
        debug_assert!(self.outcome.is_none(), "request {} completed twice", self.id);
        if self.outcome.is_some() {
            return;
        }

        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let elapsed_chrono =
            chrono::Duration::milliseconds(i64::try_from(elapsed_ms).unwrap_or(i64::MAX));

        self.outcome = Some(outcome);
        self.bytes = bytes;
        self.duration_ms = Some(elapsed_ms);
        self.completed_utc = Some(
            self.received_utc
                .checked_add_signed(elapsed_chrono)
                .unwrap_or(self.received_utc),
        );
    }

    /// Mark the request as served by a fetch another request started.
    pub(crate) fn mark_coalesced(&mut self) {
        self.coalesced = true;
    }

    /// Attach a note, such as an upstream error or a failed cache write.
    pub(crate) fn set_detail(&mut self, detail: impl Into<String>) {
        self.detail = Some(detail.into());
    }

    /// Process-local sequence number, increasing in request start order.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// When the request started.
    pub fn received_utc(&self) -> DateTime<Utc> {
        self.received_utc
    }

    /// When the request completed, `None` while in flight.
    pub fn completed_utc(&self) -> Option<DateTime<Utc>> {
        self.completed_utc
    }

    /// Request duration in milliseconds, `None` while in flight.
    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    /// Upstream server name.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Tile class.
    pub fn class(&self) -> TileClass {
        self.class
    }

    /// Zoom level.
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Tile column.
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Tile row.
    pub fn y(&self) -> u32 {
        self.y
    }

    /// High-DPI variant.
    pub fn retina(&self) -> bool {
        self.retina
    }

    /// Terminal state, `None` while in flight.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Whether the request joined another request's upstream fetch.
    pub fn is_coalesced(&self) -> bool {
        self.coalesced
    }

    /// Size of the returned tile in bytes (0 when none).
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Optional note attached during processing.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Whether the record has reached its terminal state.
    pub fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }
}
