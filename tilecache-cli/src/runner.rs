//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization, runtime creation and
//! service construction to reduce duplication across command handlers.

use std::future::Future;
use std::path::PathBuf;
use tilecache::config::ConfigFile;
use tilecache::logging::{init_logging, LoggingGuard};
use tilecache::policy::Policy;
use tilecache::provider::{AsyncReqwestClient, HttpFetcher};
use tilecache::service::TileCacheService;
use tokio::runtime::Runtime;
use tracing::info;

use crate::commands::common::{load_config, PolicyArgs};
use crate::error::CliError;

/// The coordinator as the CLI builds it.
pub type CliService = TileCacheService<HttpFetcher<AsyncReqwestClient>>;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
    runtime: Runtime,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Config file to load instead of the default
    /// * `verbose` - Log at debug level unless RUST_LOG says otherwise
    pub fn new(config_path: Option<&PathBuf>, verbose: bool) -> Result<Self, CliError> {
        let config = load_config(config_path)?;

        let level = if verbose { "debug" } else { "warn" };
        let logging_guard = init_logging(&config.logging.file, level)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;

        Ok(Self {
            logging_guard,
            config,
            runtime,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Configured policy with command-line overrides applied.
    pub fn policy(&self, overrides: &PolicyArgs) -> Policy {
        overrides.apply(self.config.policy())
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("TileCache v{}", tilecache::VERSION);
        info!("TileCache CLI: {} command", command);
    }

    /// Create the tile cache service for the configured servers.
    pub fn create_service(&self) -> Result<CliService, CliError> {
        let client = AsyncReqwestClient::new().map_err(CliError::HttpClient)?;
        let fetcher = HttpFetcher::new(client, self.config.registry());
        info!(
            servers = ?fetcher.registry().names(),
            ledger_capacity = self.config.ledger.capacity,
            "Service created"
        );
        Ok(TileCacheService::new(fetcher, self.config.ledger.capacity))
    }

    /// Run a future to completion on the runner's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
