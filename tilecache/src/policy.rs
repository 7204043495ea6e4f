//! Per-request caching policy.
//!
//! A [`Policy`] is an immutable snapshot of the caching options. The caller
//! passes the current snapshot into every
//! [`TileCacheService::handle`](crate::service::TileCacheService::handle)
//! call, so different calls can run under different policies without any
//! shared option state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::tile::TileClass;

/// Upstream timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Name of the cache folder created under the platform cache directory.
const CACHE_FOLDER_NAME: &str = "tilecache";

/// Default cache folder: `<platform cache dir>/tilecache`.
///
/// Falls back to a relative `tilecache` folder when the platform has no
/// cache directory.
pub fn default_cache_folder() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join(CACHE_FOLDER_NAME))
        .unwrap_or_else(|| PathBuf::from(CACHE_FOLDER_NAME))
}

/// Caching options for one request.
///
/// # Example
///
/// ```
/// use tilecache::policy::Policy;
/// use tilecache::tile::TileClass;
///
/// let policy = Policy::default()
///     .with_offline_mode(true)
///     .with_cache_layer_tiles(false)
///     .with_timeout_secs(5);
///
/// assert!(policy.offline_mode());
/// assert!(policy.caches(TileClass::Map));
/// assert!(!policy.caches(TileClass::Layer));
/// assert_eq!(policy.timeout().as_secs(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    enabled: bool,
    offline_mode: bool,
    cache_folder: PathBuf,
    timeout_secs: u64,
    cache_map_tiles: bool,
    cache_layer_tiles: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            enabled: true,
            offline_mode: false,
            cache_folder: default_cache_folder(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_map_tiles: true,
            cache_layer_tiles: true,
        }
    }
}

impl Policy {
    /// Set the cache folder.
    pub fn with_cache_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.cache_folder = folder.into();
        self
    }

    /// Turn caching on or off.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Forbid (or allow) upstream fetches.
    pub fn with_offline_mode(mut self, offline: bool) -> Self {
        self.offline_mode = offline;
        self
    }

    /// Set the upstream timeout in seconds.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Cache base map tiles.
    pub fn with_cache_map_tiles(mut self, cache: bool) -> Self {
        self.cache_map_tiles = cache;
        self
    }

    /// Cache overlay tiles.
    pub fn with_cache_layer_tiles(mut self, cache: bool) -> Self {
        self.cache_layer_tiles = cache;
        self
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn offline_mode(&self) -> bool {
        self.offline_mode
    }

    pub fn cache_folder(&self) -> &Path {
        &self.cache_folder
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn cache_map_tiles(&self) -> bool {
        self.cache_map_tiles
    }

    pub fn cache_layer_tiles(&self) -> bool {
        self.cache_layer_tiles
    }

    /// Upstream timeout. Never shorter than one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Whether tiles of this class are read from and written to disk.
    pub fn caches(&self, class: TileClass) -> bool {
        match class {
            TileClass::Map => self.cache_map_tiles,
            TileClass::Layer => self.cache_layer_tiles,
        }
    }
}
