use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sitestats_cli::cli::{config, run_series, run_top, SeriesArgs, TopArgs};
use sitestats_cli::tracing_setup::init_tracing;

#[derive(Parser)]
#[command(name = "sitestats")]
#[command(about = "Aggregate site stats into time series and ranked lists")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, short)]
    pretty: bool,

    /// Path to JSON config file (timeZone, firstWeekday, topListLimit)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Evaluate as if the current time were this instant (RFC 3339)
    #[arg(long)]
    now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bucket observations into a gap-filled series
    Series(SeriesArgs),

    /// Merge daily snapshots into a ranked list
    Top(TopArgs),
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::resolve(cli.config.as_deref())?;
    let now = cli.now.unwrap_or_else(Utc::now);

    match &cli.command {
        Commands::Series(args) => print_json(&run_series(&config, args, now)?, cli.pretty),
        Commands::Top(args) => print_json(&run_top(&config, args)?, cli.pretty),
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize output")?;
    println!("{}", output);
    Ok(())
}
