//! Headless colony runner.
//!
//! This binary plays the colony campaign without graphics, driven by the
//! scripted player. Designed for CI testing and balance checks.
//!
//! # Usage
//!
//! ```bash
//! # Five simulated minutes at one tick per second
//! cargo run -p colony_headless
//!
//! # A longer run with a fixed seed, persisted to a save file
//! cargo run -p colony_headless -- --seed 42 --duration-secs 1800 --save run.json
//! ```
//!
//! Output (stdout): the final run report as JSON
//! Logs (stderr): progress information

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use colony_headless::{run, RunConfig};

#[derive(Parser)]
#[command(name = "colony_headless")]
#[command(about = "Headless colony runner for scripted playthroughs")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Seed for node placement and the scripted player
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Simulated time budget in seconds
    #[arg(long, default_value = "300")]
    duration_secs: u64,

    /// Simulated milliseconds per tick
    #[arg(long, default_value = "1000")]
    tick_ms: u64,

    /// Save file to resume from and persist to
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let config = RunConfig {
        seed: cli.seed,
        duration_secs: cli.duration_secs,
        tick_ms: cli.tick_ms,
        save_path: cli.save,
    };

    match run(&config) {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize report");
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            std::process::exit(1);
        }
    }
}
