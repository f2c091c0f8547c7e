mod agent;
mod config;
mod engine;
mod signal;
mod stats;

use crate::config::Config;
use crate::engine::Engine;
use crate::stats::Summary;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 50)]
    steps: usize,

    /// Seed of the pseudo-random arrival stream.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// TOML file overriding the default signal tuning.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print aggregate statistics after the report.
    #[arg(long)]
    summary: bool,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let cfg = match &args.config {
        Some(file) => Config::from_file(file).context("failed to load config")?,
        None => Config::default(),
    };
    log::info!("{cfg:#?}");

    let mut engine = Engine::new(cfg, args.seed).context("failed to construct engine")?;
    let records = engine.run(args.steps).context("failed to run simulation")?;

    for record in &records {
        println!("{record}");
    }

    if args.summary {
        println!("{}", Summary::from_records(&records));
    }

    Ok(())
}
