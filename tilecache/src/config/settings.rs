//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Cache policy settings
    pub cache: CacheSettings,
    /// Upstream download settings
    pub download: DownloadSettings,
    /// Activity ledger settings
    pub ledger: LedgerSettings,
    /// Logging settings
    pub logging: LoggingSettings,
    /// Upstream tile servers, one per `[server.<name>]` section
    pub servers: Vec<ServerSettings>,
}

/// Cache configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Serve tiles through the cache at all
    pub enabled: bool,
    /// Never contact upstream servers
    pub offline_mode: bool,
    /// Cache directory path
    pub directory: PathBuf,
    /// Cache base map tiles
    pub cache_map_tiles: bool,
    /// Cache overlay tiles
    pub cache_layer_tiles: bool,
}

/// Download configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    /// Upstream timeout in seconds
    pub timeout: u64,
}

/// Activity ledger configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSettings {
    /// Number of recent requests kept
    pub capacity: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

/// One upstream tile server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    /// Name used in tile requests and as the cache subdirectory
    pub name: String,
    /// URL template
    pub url: String,
    /// Tile format, used as the cache file extension
    pub format: String,
    /// Subdomains substituted for `{s}`; empty means the defaults
    pub subdomains: Vec<String>,
}

impl ConfigFile {
    /// Look up a server by name.
    pub fn server(&self, name: &str) -> Option<&ServerSettings> {
        self.servers.iter().find(|s| s.name == name)
    }

    /// Add a server, replacing any server with the same name.
    pub fn upsert_server(&mut self, server: ServerSettings) {
        match self.servers.iter_mut().find(|s| s.name == server.name) {
            Some(existing) => *existing = server,
            None => self.servers.push(server),
        }
    }
}
