//! Common argument types and helpers shared across CLI commands.

use clap::Args;
use std::path::PathBuf;
use tilecache::config::ConfigFile;
use tilecache::ledger::RequestOutcome;
use tilecache::policy::Policy;
use tilecache::tile::{TileClass, TileRequest};

use crate::error::CliError;

/// Identifies one tile.
#[derive(Debug, Clone, Args)]
pub struct TileArgs {
    /// Tile server name, as configured in a [server.<name>] section
    #[arg(long, short = 's', default_value = "osm")]
    pub server: String,

    /// Zoom level
    pub zoom: u8,

    /// Tile column
    pub x: u32,

    /// Tile row
    pub y: u32,

    /// Request the high-DPI (@2x) variant
    #[arg(long)]
    pub retina: bool,

    /// Tile class: map or layer
    #[arg(long, default_value = "map")]
    pub class: TileClass,
}

impl TileArgs {
    /// Build the tile request.
    pub fn to_request(&self) -> TileRequest {
        TileRequest::new(self.server.clone(), self.zoom, self.x, self.y)
            .with_retina(self.retina)
            .with_class(self.class)
    }
}

/// Per-invocation overrides of the configured policy.
#[derive(Debug, Clone, Default, Args)]
pub struct PolicyArgs {
    /// Serve from cache only, never contact upstream
    #[arg(long, conflicts_with = "online")]
    pub offline: bool,

    /// Allow upstream fetches even if offline mode is configured
    #[arg(long)]
    pub online: bool,

    /// Upstream timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Cache directory (overrides config)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

impl PolicyArgs {
    /// Apply the overrides to the configured policy.
    pub fn apply(&self, mut policy: Policy) -> Policy {
        if self.offline {
            policy = policy.with_offline_mode(true);
        }
        if self.online {
            policy = policy.with_offline_mode(false);
        }
        if let Some(secs) = self.timeout {
            policy = policy.with_timeout_secs(secs);
        }
        if let Some(dir) = &self.cache_dir {
            policy = policy.with_cache_folder(dir);
        }
        policy
    }
}

/// Load the configuration from an explicit path or the default location.
pub fn load_config(path: Option<&PathBuf>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}

/// Format a byte count for display.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// One ledger row as a line of text.
pub fn format_outcome_row(record: &RequestOutcome) -> String {
    let outcome = record
        .outcome()
        .map(|o| o.to_string())
        .unwrap_or_else(|| "pending".to_string());
    let retina = if record.retina() { "@2x" } else { "" };
    let coalesced = if record.is_coalesced() { " (shared)" } else { "" };

    format!(
        "{:>6}  {}:{}/{}/{}{}  {:<14} {:>6} ms {:>9}{}",
        record.id(),
        record.server(),
        record.zoom(),
        record.x(),
        record.y(),
        retina,
        outcome,
        record.duration_ms().unwrap_or(0),
        format_bytes(record.bytes() as u64),
        coalesced,
    )
}
