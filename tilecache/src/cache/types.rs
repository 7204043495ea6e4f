//! Core types for the disk cache.

use crate::tile::TileRequest;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Cache key uniquely identifying a cached tile.
///
/// Includes every field that selects a distinct upstream asset: server name,
/// zoom, coordinates and the retina variant. The tile class is deliberately
/// absent; it only decides whether a tile is cached, not which bytes it is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Upstream server name (unsanitized)
    pub server: String,
    /// Zoom level
    pub zoom: u8,
    /// Tile column
    pub x: u32,
    /// Tile row
    pub y: u32,
    /// High-DPI variant
    pub retina: bool,
}

impl CacheKey {
    /// Create a new cache key.
    pub fn new(server: impl Into<String>, zoom: u8, x: u32, y: u32, retina: bool) -> Self {
        Self {
            server: server.into(),
            zoom,
            x,
            y,
            retina,
        }
    }
}

impl From<&TileRequest> for CacheKey {
    fn from(request: &TileRequest) -> Self {
        Self::new(
            request.server(),
            request.zoom(),
            request.x(),
            request.y(),
            request.retina(),
        )
    }
}

/// Disk I/O failure while reading or writing a tile.
///
/// Never fatal to a request: a failed write still returns the fetched bytes.
#[derive(Debug, Error)]
#[error("Cache I/O error at {}: {source}", .path.display())]
pub struct StoreError {
    /// Path being accessed when the error occurred
    pub path: PathBuf,
    /// Underlying I/O error
    #[source]
    pub source: io::Error,
}

impl StoreError {
    /// Wrap an I/O error with the path it concerns.
    pub fn new(path: &Path, source: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The kind of the underlying I/O error.
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

/// Disk usage of a cache folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheUsage {
    /// Number of cached tile files
    pub files: u64,
    /// Total size of cached tile files in bytes
    pub bytes: u64,
}
