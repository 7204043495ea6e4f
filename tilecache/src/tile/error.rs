//! Error types for tile requests.

use thiserror::Error;

/// A tile request that does not address a real tile.
///
/// These are caller errors: they are reported before any storage or network
/// access and are never recorded in the activity ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    /// Server name is empty or whitespace
    #[error("Invalid tile request: server name is empty")]
    EmptyServerName,

    /// Zoom level above the supported maximum
    #[error("Invalid tile request: zoom {zoom} exceeds maximum of {max}")]
    ZoomOutOfRange { zoom: u8, max: u8 },

    /// Column or row outside `[0, 2^zoom)`
    #[error("Invalid tile request: ({x}, {y}) outside [0, {limit}) at zoom {zoom}")]
    CoordinateOutOfRange { x: u32, y: u32, zoom: u8, limit: u64 },
}
