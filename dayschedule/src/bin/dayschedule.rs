//! Day schedule command line tool.
//!
//! Computes the schedule of one instant from a TOML configuration and a JSON
//! file of astronomy records, and prints the readings.
//!
//! # Usage
//!
//! ```bash
//! dayschedule --config data/berlin.toml --astronomy data/berlin-2024-06.json \
//!     --at 2024-06-21T12:00:00+02:00
//! dayschedule --config data/berlin.toml --astronomy data/berlin-2024-06.json --json
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter (default: info, `-v` raises it to debug)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dayschedule::astro::LocalAstronomy;
use dayschedule::config::ScheduleConfig;
use dayschedule::scheduler::next_wakeup;
use dayschedule::DaySchedule;

#[derive(Parser, Debug)]
#[command(name = "dayschedule", version, about = "Compute the schedule of a day")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// JSON file with astronomy records keyed by date
    #[arg(short, long)]
    astronomy: PathBuf,

    /// Instant to evaluate (RFC 3339), defaults to now
    #[arg(long)]
    at: Option<DateTime<chrono::FixedOffset>>,

    /// Print the full record as JSON instead of the flat readings
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(true)
        .init();

    let settings = ScheduleConfig::from_file(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?
        .validate()
        .context("Invalid configuration")?;
    let provider = LocalAstronomy::from_file(&cli.astronomy)
        .with_context(|| format!("Failed to load {}", cli.astronomy.display()))?;
    info!("Loaded {} astronomy records", provider.len());

    let schedule = DaySchedule::new(settings, Arc::new(provider));
    let timestamp = cli
        .at
        .map(|at| at.with_timezone(&Utc).timestamp())
        .unwrap_or_else(|| Utc::now().timestamp());
    let record = schedule
        .update(timestamp)
        .context("Schedule computation failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(record.as_ref())?);
    } else {
        for (key, value) in record.readings() {
            println!("{:<24} {}", key, value);
        }
    }

    match next_wakeup(&record)? {
        Some(at) => info!("Next wake-up at {}", at.to_rfc3339()),
        None => info!("No upcoming wake-up"),
    }
    Ok(())
}
