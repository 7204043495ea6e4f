//! Default values and the `ConfigFile::default()` implementation.

use std::path::PathBuf;

use super::settings::*;
use crate::cache::DEFAULT_TILE_EXTENSION;
use crate::ledger::DEFAULT_LEDGER_CAPACITY;
use crate::policy::{default_cache_folder, DEFAULT_TIMEOUT_SECS};
use crate::provider::DEFAULT_OSM_URL;

/// Default upstream timeout in seconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = DEFAULT_TIMEOUT_SECS;

/// Server present in every default configuration.
pub const DEFAULT_SERVER_NAME: &str = "osm";

/// Default log file: `~/.tilecache/tilecache.log`.
pub fn default_log_file() -> PathBuf {
    super::file::config_directory().join("tilecache.log")
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            cache: CacheSettings {
                enabled: true,
                offline_mode: false,
                directory: default_cache_folder(),
                cache_map_tiles: true,
                cache_layer_tiles: true,
            },
            download: DownloadSettings {
                timeout: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            },
            ledger: LedgerSettings {
                capacity: DEFAULT_LEDGER_CAPACITY,
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
            servers: vec![ServerSettings {
                name: DEFAULT_SERVER_NAME.to_string(),
                url: DEFAULT_OSM_URL.to_string(),
                format: DEFAULT_TILE_EXTENSION.to_string(),
                subdomains: Vec::new(),
            }],
        }
    }
}
