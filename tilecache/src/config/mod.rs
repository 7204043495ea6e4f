//! Configuration file handling.
//!
//! Settings live in an INI file (`~/.tilecache/config.ini` by default) and
//! are turned into the values the engine consumes: a [`Policy`] per request
//! and a [`TileServerRegistry`] for the fetcher.
//!
//! [`Policy`]: crate::policy::Policy
//! [`TileServerRegistry`]: crate::provider::TileServerRegistry
//!
//! # Example
//!
//! ```no_run
//! use tilecache::config::ConfigFile;
//!
//! let config = ConfigFile::load()?;
//! let policy = config.policy();
//! let registry = config.registry();
//! # Ok::<(), tilecache::config::ConfigFileError>(())
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{default_log_file, DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_SERVER_NAME};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    CacheSettings, ConfigFile, DownloadSettings, LedgerSettings, LoggingSettings, ServerSettings,
};
