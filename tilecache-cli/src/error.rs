//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;
use tilecache::cache::StoreError;
use tilecache::config::ConfigFileError;
use tilecache::ledger::Outcome;
use tilecache::provider::FetchError;
use tilecache::tile::TileError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to build the async runtime
    Runtime(std::io::Error),
    /// Failed to create the HTTP client
    HttpClient(FetchError),
    /// Tile coordinates rejected
    InvalidTile(TileError),
    /// Request completed without a tile
    TileUnavailable {
        outcome: Outcome,
        detail: Option<String>,
    },
    /// Failed to write output file
    FileWrite { path: String, error: std::io::Error },
    /// Disk cache operation failed
    Cache(StoreError),
    /// Failed to encode output
    Output(serde_json::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::TileUnavailable {
                outcome: Outcome::OfflineMiss,
                ..
            } => {
                eprintln!();
                eprintln!("Offline mode is on and the tile is not cached.");
                eprintln!("Run with --online or set offline_mode = false in config.ini");
            }
            CliError::TileUnavailable {
                outcome: Outcome::Disabled,
                ..
            } => {
                eprintln!();
                eprintln!("Caching is disabled. Set enabled = true in the [cache] section.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::InvalidTile(e) => write!(f, "{}", e),
            CliError::TileUnavailable { outcome, detail } => match detail {
                Some(detail) => write!(f, "Tile unavailable ({}): {}", outcome, detail),
                None => write!(f, "Tile unavailable ({})", outcome),
            },
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
            CliError::Cache(e) => write!(f, "Cache error: {}", e),
            CliError::Output(e) => write!(f, "Failed to encode output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Runtime(e) => Some(e),
            CliError::HttpClient(e) => Some(e),
            CliError::InvalidTile(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::Cache(e) => Some(e),
            CliError::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<TileError> for CliError {
    fn from(e: TileError) -> Self {
        CliError::InvalidTile(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Cache(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e)
    }
}
