//! TileCache CLI - Command-line interface
//!
//! This binary drives the tilecache library: fetch tiles through the cache,
//! warm a region ahead of time, inspect cache locations and manage config.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::cache::CacheAction;
use commands::config::ConfigCommands;
use commands::get::GetArgs;
use commands::path::PathArgs;
use commands::warm::WarmArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "tilecache")]
#[command(version = tilecache::VERSION)]
#[command(about = "Disk-backed caching proxy for slippy-map tile servers", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.tilecache/config.ini
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one tile through the cache
    Get(GetArgs),

    /// Pre-fill the cache for a rectangle of tiles
    Warm(WarmArgs),

    /// Show where a tile is stored in the cache
    Path(PathArgs),

    /// Manage the disk cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_ref();

    match cli.command {
        Commands::Get(args) => {
            let runner = CliRunner::new(config_path, cli.verbose)?;
            commands::get::run(&runner, args)
        }
        Commands::Warm(args) => {
            let runner = CliRunner::new(config_path, cli.verbose)?;
            commands::warm::run(&runner, args)
        }
        Commands::Cache { action } => {
            let runner = CliRunner::new(config_path, cli.verbose)?;
            commands::cache::run(&runner, action)
        }
        Commands::Path(args) => {
            let config = commands::common::load_config(config_path)?;
            commands::path::run(&config, args)
        }
        Commands::Config { command } => commands::config::run(config_path, command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_get_with_overrides() {
        let cli = Cli::try_parse_from([
            "tilecache", "get", "3", "2", "1", "--server", "topo", "--retina", "--offline",
            "--timeout", "4",
        ])
        .unwrap();

        let Commands::Get(args) = cli.command else {
            panic!("expected get");
        };
        assert_eq!(args.tile.server, "topo");
        assert_eq!((args.tile.zoom, args.tile.x, args.tile.y), (3, 2, 1));
        assert!(args.tile.retina);
        assert!(args.policy.offline);
        assert_eq!(args.policy.timeout, Some(4));
    }

    #[test]
    fn test_offline_and_online_conflict() {
        let result = Cli::try_parse_from(["tilecache", "get", "3", "2", "1", "--offline", "--online"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = Cli::try_parse_from(["tilecache", "get", "3", "2", "1", "--timeout", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli =
            Cli::try_parse_from(["tilecache", "config", "path", "--config", "/tmp/t.ini"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/t.ini")));
    }
}
