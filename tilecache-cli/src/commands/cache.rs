//! Cache management CLI commands.

use clap::Subcommand;
use std::path::{Path, PathBuf};
use tilecache::cache::{server_directory, CacheUsage, DiskStore};

use super::common::format_bytes;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show disk cache statistics
    Stats {
        /// Limit to one tile server
        #[arg(long, short = 's')]
        server: Option<String>,
    },
    /// Clear the disk cache, removing cached tiles
    Clear {
        /// Only remove tiles of this server
        #[arg(long, short = 's')]
        server: Option<String>,
    },
}

/// Run a cache subcommand.
pub fn run(runner: &CliRunner, action: CacheAction) -> Result<(), CliError> {
    runner.log_startup("cache");
    let cache_dir = runner.config().cache.directory.clone();

    match action {
        CacheAction::Stats { server } => {
            let target = target_directory(&cache_dir, server.as_deref());
            println!("Disk cache: {}", target.display());

            let usage = runner.block_on(DiskStore::usage(&target))?;
            println!("  Files: {}", usage.files);
            println!("  Size:  {}", format_bytes(usage.bytes));
            Ok(())
        }
        CacheAction::Clear { server } => {
            let target = target_directory(&cache_dir, server.as_deref());
            println!("Clearing disk cache at: {}", target.display());

            let removed = runner.block_on(DiskStore::clear(&target))?;
            println!("{}", clear_summary(&removed));
            Ok(())
        }
    }
}

fn target_directory(cache_dir: &Path, server: Option<&str>) -> PathBuf {
    match server {
        Some(name) => server_directory(cache_dir, name),
        None => cache_dir.to_path_buf(),
    }
}

fn clear_summary(removed: &CacheUsage) -> String {
    if removed.files == 0 {
        "Nothing to delete".to_string()
    } else {
        format!(
            "Deleted {} files, freed {}",
            removed.files,
            format_bytes(removed.bytes)
        )
    }
}
