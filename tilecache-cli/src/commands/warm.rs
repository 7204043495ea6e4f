//! Pre-fill the cache for a rectangle of tiles.
//!
//! Requests run concurrently through the same coordinator, so the ledger
//! printed at the end is exactly what a monitoring view would show.

use clap::Args;
use futures::stream::{self, StreamExt};
use std::ops::RangeInclusive;
use tilecache::ledger::Outcome;
use tilecache::tile::{TileClass, TileRequest};

use super::common::{format_bytes, format_outcome_row, PolicyArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Upper bound on tiles per invocation.
pub const MAX_WARM_TILES: u64 = 100_000;

/// Arguments for `tilecache warm`.
#[derive(Debug, Args)]
pub struct WarmArgs {
    /// Tile server name
    #[arg(long, short = 's', default_value = "osm")]
    pub server: String,

    /// Zoom level
    pub zoom: u8,

    /// First tile column
    #[arg(long)]
    pub min_x: u32,

    /// Last tile column (inclusive)
    #[arg(long)]
    pub max_x: u32,

    /// First tile row
    #[arg(long)]
    pub min_y: u32,

    /// Last tile row (inclusive)
    #[arg(long)]
    pub max_y: u32,

    /// Request the high-DPI (@2x) variants
    #[arg(long)]
    pub retina: bool,

    /// Tile class: map or layer
    #[arg(long, default_value = "map")]
    pub class: TileClass,

    /// Maximum concurrent requests
    #[arg(long, short = 'j', default_value = "8", value_parser = clap::value_parser!(u16).range(1..=256))]
    pub concurrency: u16,

    /// Print the ledger as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

impl WarmArgs {
    fn columns(&self) -> RangeInclusive<u32> {
        self.min_x..=self.max_x
    }

    fn rows(&self) -> RangeInclusive<u32> {
        self.min_y..=self.max_y
    }

    /// Number of tiles in the rectangle.
    pub fn tile_count(&self) -> u64 {
        let width = u64::from(self.max_x.saturating_sub(self.min_x)) + 1;
        let height = u64::from(self.max_y.saturating_sub(self.min_y)) + 1;
        width * height
    }

    /// Every tile in the rectangle, row by row.
    pub fn requests(&self) -> Result<Vec<TileRequest>, CliError> {
        if self.min_x > self.max_x || self.min_y > self.max_y {
            return Err(CliError::Config(
                "empty range: --min-x/--min-y must not exceed --max-x/--max-y".to_string(),
            ));
        }
        if self.tile_count() > MAX_WARM_TILES {
            return Err(CliError::Config(format!(
                "{} tiles requested, at most {} per run",
                self.tile_count(),
                MAX_WARM_TILES
            )));
        }

        let mut requests = Vec::new();
        for y in self.rows() {
            for x in self.columns() {
                let request = TileRequest::new(self.server.clone(), self.zoom, x, y)
                    .with_retina(self.retina)
                    .with_class(self.class);
                request.validate()?;
                requests.push(request);
            }
        }
        Ok(requests)
    }
}

/// Run the warm command.
pub fn run(runner: &CliRunner, args: WarmArgs) -> Result<(), CliError> {
    runner.log_startup("warm");

    let requests = args.requests()?;
    let service = runner.create_service()?;
    let policy = runner.policy(&args.policy);
    let concurrency = usize::from(args.concurrency);

    if !args.json {
        println!(
            "Warming {} tiles from '{}' at zoom {} ({} concurrent)",
            requests.len(),
            args.server,
            args.zoom,
            concurrency
        );
    }

    let results = runner.block_on(
        stream::iter(requests.iter())
            .map(|request| service.handle(request, &policy))
            .buffer_unordered(concurrency)
            .collect::<Vec<_>>(),
    );
    // Every request was validated up front
    for result in results {
        result?;
    }

    let ledger = service.ledger();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&ledger.snapshot())?);
        return Ok(());
    }

    if ledger.len() < requests.len() {
        println!(
            "(showing the last {} of {} requests)",
            ledger.len(),
            requests.len()
        );
    }
    for record in ledger.snapshot() {
        println!("{}", format_outcome_row(&record));
    }

    let stats = ledger.stats();
    let bytes: u64 = ledger.snapshot().iter().map(|r| r.bytes() as u64).sum();
    println!();
    println!("Summary:");
    for outcome in Outcome::ALL {
        let count = stats.count(outcome);
        if count > 0 {
            println!("  {:<14} {}", outcome.to_string(), count);
        }
    }
    println!("  Shared fetches {}", stats.coalesced);
    println!("  Hit ratio      {:.1}%", stats.hit_ratio() * 100.0);
    println!("  Data           {}", format_bytes(bytes));

    service.log_coalescer_stats();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(min_x: u32, max_x: u32, min_y: u32, max_y: u32) -> WarmArgs {
        WarmArgs {
            server: "osm".to_string(),
            zoom: 3,
            min_x,
            max_x,
            min_y,
            max_y,
            retina: false,
            class: TileClass::Map,
            concurrency: 4,
            json: false,
            policy: PolicyArgs::default(),
        }
    }

    #[test]
    fn test_requests_cover_rectangle() {
        let requests = args(1, 2, 5, 6).requests().unwrap();

        let coords: Vec<_> = requests.iter().map(|r| (r.x(), r.y())).collect();
        assert_eq!(coords, vec![(1, 5), (2, 5), (1, 6), (2, 6)]);
    }

    #[test]
    fn test_out_of_range_rejected() {
        // zoom 3 has 8 columns
        assert!(matches!(
            args(6, 8, 0, 0).requests(),
            Err(CliError::InvalidTile(_))
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(matches!(
            args(3, 2, 0, 0).requests(),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_tile_count() {
        assert_eq!(args(0, 7, 0, 7).tile_count(), 64);
    }
}
