//! lake-gold - recompute daily summaries from the silver store

use anyhow::{bail, Result};
use clap::Parser;
use lake_common::config::TomlConfig;
use lake_common::logging::init_tracing;
use lake_common::TracingReporter;
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments for lake-gold
#[derive(Parser, Debug)]
#[command(name = "lake-gold")]
#[command(about = "Aggregate VALID silver records into daily gold summaries")]
#[command(version)]
struct Args {
    /// Silver database file (overrides the configured location)
    #[arg(long)]
    silver_db: Option<PathBuf>,

    /// Gold database file (overrides the configured location)
    #[arg(long)]
    gold_db: Option<PathBuf>,

    /// Folder holding the tier databases
    #[arg(short, long, env = "LAKE_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, config_source) = TomlConfig::load(args.config.as_deref())?;
    init_tracing(&config.logging)?;
    config_source.log();

    info!("Starting lake-gold v{}", env!("CARGO_PKG_VERSION"));

    let paths = config.store_paths(args.root_folder.as_deref());
    let silver_db = args.silver_db.unwrap_or(paths.silver);
    let gold_db = args.gold_db.unwrap_or(paths.gold);

    info!("Aggregating data into gold database: {}", gold_db.display());

    if !lake_gold::aggregate_files(&silver_db, &gold_db, &TracingReporter).await {
        bail!("Gold layer aggregation failed");
    }

    info!("Gold layer aggregation completed successfully.");
    Ok(())
}
