//! lake - run and inspect the bronze/silver/gold pipeline

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lake_common::config::TomlConfig;
use lake_common::logging::init_tracing;
use lake_common::{Stage, TracingReporter};
use lake_pipeline::{
    export_tier, handle_object_created, run_pipeline, tier_stats, TriggerFilter, TriggerOutcome,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "lake")]
#[command(about = "Bronze/silver/gold transaction pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Folder holding the tier databases
    #[arg(short, long, global = true, env = "LAKE_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest a file and promote it through every tier
    Run {
        /// Source CSV file
        source: PathBuf,
    },
    /// Ingest a file into bronze only
    Ingest {
        /// Source CSV file
        source: PathBuf,
    },
    /// Promote new bronze records into silver
    Promote,
    /// Recompute gold summaries from silver
    Aggregate,
    /// Handle an object-created notification for `object`
    Trigger {
        /// Path of the newly created object
        object: PathBuf,
    },
    /// Show row counts per tier
    Stats,
    /// Export a tier table to CSV
    Export {
        #[arg(value_enum)]
        tier: Tier,
        /// Output CSV file
        out: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Tier {
    Bronze,
    Silver,
    Gold,
}

impl From<Tier> for Stage {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Bronze => Stage::Bronze,
            Tier::Silver => Stage::Silver,
            Tier::Gold => Stage::Gold,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_source) = TomlConfig::load(cli.config.as_deref())?;
    init_tracing(&config.logging)?;
    config_source.log();

    let paths = config.store_paths(cli.root_folder.as_deref());
    let reporter = TracingReporter;

    match cli.command {
        Commands::Run { source } => {
            let outcome = run_pipeline(&source, &paths, &reporter).await;
            if !outcome.succeeded() {
                bail!("Pipeline failed: {:?}", outcome);
            }
        }
        Commands::Ingest { source } => {
            if !lake_bronze::ingest_file(&source, &paths.bronze, &reporter).await {
                bail!("Bronze layer ingestion failed");
            }
        }
        Commands::Promote => {
            if !lake_silver::promote_files(&paths.bronze, &paths.silver, &reporter).await {
                bail!("Silver layer processing failed");
            }
        }
        Commands::Aggregate => {
            if !lake_gold::aggregate_files(&paths.silver, &paths.gold, &reporter).await {
                bail!("Gold layer aggregation failed");
            }
        }
        Commands::Trigger { object } => {
            let filter = TriggerFilter::from(&config.trigger);
            match handle_object_created(&object, &filter, &paths, &reporter).await {
                TriggerOutcome::Ignored => {}
                TriggerOutcome::Ran(outcome) if outcome.succeeded() => {}
                TriggerOutcome::Ran(outcome) => bail!("Pipeline failed: {:?}", outcome),
            }
        }
        Commands::Stats => {
            let stats = tier_stats(&paths).await?;
            println!("{}", stats);
        }
        Commands::Export { tier, out } => {
            let rows = export_tier(tier.into(), &paths, &out).await?;
            info!("{} rows exported", rows);
        }
    }

    Ok(())
}
