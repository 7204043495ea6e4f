//! Disk store for cached tiles.
//!
//! Reads are plain file reads; a missing file is a normal miss, not an error.
//! Writes go to a uniquely named temp file in the target directory and are
//! renamed into place, so a concurrent reader sees either no file or the
//! complete file, never a partial one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use tracing::{debug, trace};

use crate::cache::types::{CacheUsage, StoreError};

/// Extension of in-progress writes. Skipped when measuring usage.
const TEMP_EXTENSION: &str = "tmp";

/// Sequence for temp file names, unique within the process.
static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Snapshot of disk store counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskStoreStats {
    /// Reads that found a tile
    pub hits: u64,
    /// Reads that found nothing
    pub misses: u64,
    /// Successful writes
    pub writes: u64,
    /// Failed reads or writes
    pub errors: u64,
}

/// Reads and writes tile bytes at mapped cache paths.
#[derive(Debug, Default)]
pub struct DiskStore {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    errors: AtomicU64,
}

impl DiskStore {
    /// Create a new disk store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a tile.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub async fn try_read(&self, path: &Path) -> Result<Option<Bytes>, StoreError> {
        match tokio::fs::read(path).await {
            Ok(data) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(path = %path.display(), bytes = data.len(), "Disk cache hit");
                Ok(Some(Bytes::from(data)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(path = %path.display(), "Disk cache miss");
                Ok(None)
            }
            Err(e) => {
                self.errors.fetch_add(1, Ordering::Relaxed);
                Err(StoreError::new(path, e))
            }
        }
    }

    /// Write a tile atomically, creating parent directories as needed.
    pub async fn write(&self, path: &Path, data: &[u8]) -> Result<(), StoreError> {
        let result = Self::write_atomic(path, data).await;
        match &result {
            Ok(()) => {
                self.writes.fetch_add(1, Ordering::Relaxed);
                debug!(path = %path.display(), bytes = data.len(), "Tile written to disk cache");
            }
            Err(_) => {
                self.errors.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }

    /// Get a snapshot of the store counters.
    pub fn stats(&self) -> DiskStoreStats {
        DiskStoreStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }

    /// Measure the tiles stored under a cache folder.
    ///
    /// A missing folder counts as empty. Runs on the blocking pool.
    pub async fn usage(cache_dir: &Path) -> Result<CacheUsage, StoreError> {
        let dir = cache_dir.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let mut usage = CacheUsage::default();
            collect_usage(&dir, &mut usage)?;
            Ok(usage)
        })
        .await
        .map_err(|e| StoreError::new(cache_dir, io::Error::other(e.to_string())))?
    }

    /// Delete everything under a cache folder.
    ///
    /// Returns what was removed. A missing folder is not an error.
    pub async fn clear(cache_dir: &Path) -> Result<CacheUsage, StoreError> {
        let usage = Self::usage(cache_dir).await?;
        match tokio::fs::remove_dir_all(cache_dir).await {
            Ok(()) => Ok(usage),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(CacheUsage::default()),
            Err(e) => Err(StoreError::new(cache_dir, e)),
        }
    }

    async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::new(parent, e))?;
        }

        let temp_path = temp_path_for(path);
        if let Err(e) = tokio::fs::write(&temp_path, data).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StoreError::new(&temp_path, e));
        }

        if let Err(e) = tokio::fs::rename(&temp_path, path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StoreError::new(path, e));
        }

        Ok(())
    }
}

/// Temp file next to the target: `.<name>.<pid>.<seq>.tmp`.
///
/// Same directory so the rename never crosses filesystems; pid and sequence
/// keep concurrent writers of the same tile apart.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let seq = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(
        ".{}.{}.{}.{}",
        name,
        std::process::id(),
        seq,
        TEMP_EXTENSION
    ))
}

fn collect_usage(dir: &Path, usage: &mut CacheUsage) -> Result<(), StoreError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(StoreError::new(dir, e)),
    };

    for entry in entries {
        let entry = entry.map_err(|e| StoreError::new(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| StoreError::new(&path, e))?;

        if file_type.is_dir() {
            collect_usage(&path, usage)?;
        } else if file_type.is_file()
            && path.extension().and_then(|e| e.to_str()) != Some(TEMP_EXTENSION)
        {
            let metadata = entry.metadata().map_err(|e| StoreError::new(&path, e))?;
            usage.files += 1;
            usage.bytes += metadata.len();
        }
    }

    Ok(())
}
