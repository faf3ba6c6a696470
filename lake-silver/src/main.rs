//! lake-silver - promote new bronze records into the silver store

use anyhow::{bail, Result};
use clap::Parser;
use lake_common::config::TomlConfig;
use lake_common::logging::init_tracing;
use lake_common::TracingReporter;
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments for lake-silver
#[derive(Parser, Debug)]
#[command(name = "lake-silver")]
#[command(about = "Promote new bronze records into the silver store")]
#[command(version)]
struct Args {
    /// Bronze database file (overrides the configured location)
    #[arg(long)]
    bronze_db: Option<PathBuf>,

    /// Silver database file (overrides the configured location)
    #[arg(long)]
    silver_db: Option<PathBuf>,

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

    info!("Starting lake-silver v{}", env!("CARGO_PKG_VERSION"));

    let paths = config.store_paths(args.root_folder.as_deref());
    let bronze_db = args.bronze_db.unwrap_or(paths.bronze);
    let silver_db = args.silver_db.unwrap_or(paths.silver);

    info!("Reading from: {}", bronze_db.display());
    info!("Saving database to: {}", silver_db.display());

    if !lake_silver::promote_files(&bronze_db, &silver_db, &TracingReporter).await {
        bail!("Silver layer processing failed");
    }

    info!("Silver layer processing completed successfully.");
    Ok(())
}
