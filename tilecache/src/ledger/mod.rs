//! Recent-activity ledger.
//!
//! Every completed tile request is recorded as a [`RequestOutcome`] in a
//! fixed-capacity [`ActivityLedger`]. Monitoring surfaces poll
//! [`ActivityLedger::snapshot`] or [`ActivityLedger::since`] with the cursor
//! from their previous poll, and key rows by [`RequestOutcome::id`].
//!
//! # Architecture
//!
//! ```text
//! TileCacheService             ActivityLedger                Monitor
//!    │                              │                           │
//!    │ append(outcome)              │                           │
//!    ├─────────────────────────────►│                           │
//!    │                              │ push back, evict front    │
//!    │                              │                           │
//!    │                              │ since(cursor)             │
//!    │                              │◄───────────────────────────┤
//!    │                              │ LedgerPage                │
//!    │                              ├───────────────────────────►│
//! ```

mod activity;
mod outcome;

use std::time::Duration;

pub use activity::{ActivityLedger, LedgerPage, LedgerStats, DEFAULT_LEDGER_CAPACITY};
pub use outcome::{Outcome, RequestOutcome};

/// Recommended polling interval for a monitoring view that is open.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polling interval to back off to after a transport failure.
pub const POLL_BACKOFF: Duration = Duration::from_secs(5);
