//! lake-bronze - ingest one raw transaction file into the bronze store

use anyhow::{bail, Result};
use clap::Parser;
use lake_common::config::TomlConfig;
use lake_common::logging::init_tracing;
use lake_common::TracingReporter;
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments for lake-bronze
#[derive(Parser, Debug)]
#[command(name = "lake-bronze")]
#[command(about = "Ingest a raw transaction CSV into the bronze store")]
#[command(version)]
struct Args {
    /// Source CSV file
    source: PathBuf,

    /// Bronze database file (overrides the configured location)
    #[arg(long)]
    db: Option<PathBuf>,

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

    info!("Starting lake-bronze v{}", env!("CARGO_PKG_VERSION"));

    let db_path = match args.db {
        Some(path) => path,
        None => config.store_paths(args.root_folder.as_deref()).bronze,
    };

    if !lake_bronze::ingest_file(&args.source, &db_path, &TracingReporter).await {
        bail!("Bronze layer ingestion failed");
    }

    info!("Bronze layer ingestion completed successfully.");
    Ok(())
}
