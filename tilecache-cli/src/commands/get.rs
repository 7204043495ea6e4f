//! Fetch a single tile through the cache.

use clap::Args;
use std::path::PathBuf;

use super::common::{format_bytes, PolicyArgs, TileArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for `tilecache get`.
#[derive(Debug, Args)]
pub struct GetArgs {
    #[command(flatten)]
    pub tile: TileArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Write the tile bytes to this file
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Print the request record as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the get command.
pub fn run(runner: &CliRunner, args: GetArgs) -> Result<(), CliError> {
    runner.log_startup("get");

    let service = runner.create_service()?;
    let policy = runner.policy(&args.policy);
    let request = args.tile.to_request();

    let response = runner.block_on(service.handle(&request, &policy))?;
    let record = &response.outcome;

    if args.json {
        println!("{}", serde_json::to_string_pretty(record)?);
    }

    let Some(data) = response.data else {
        return Err(CliError::TileUnavailable {
            outcome: record.outcome().unwrap_or(tilecache::ledger::Outcome::UpstreamError),
            detail: record.detail().map(str::to_string),
        });
    };

    if !args.json {
        println!(
            "{}: {} ({}, {} ms)",
            request,
            record
                .outcome()
                .map(|o| o.to_string())
                .unwrap_or_default(),
            format_bytes(data.len() as u64),
            record.duration_ms().unwrap_or(0)
        );
        if let Some(note) = record.detail() {
            println!("  Note: {}", note);
        }
    }

    if let Some(path) = args.output {
        std::fs::write(&path, &data).map_err(|e| CliError::FileWrite {
            path: path.display().to_string(),
            error: e,
        })?;
        if !args.json {
            println!("  Saved to {}", path.display());
        }
    }

    Ok(())
}
