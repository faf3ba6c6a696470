//! Sequential three-stage run

use lake_common::config::StorePaths;
use lake_common::Reporter;
use std::path::Path;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// How one stage of a pipeline run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Succeeded,
    Failed,
    /// Not attempted because an earlier stage failed
    Skipped,
}

impl StageOutcome {
    fn from_success(ok: bool) -> Self {
        if ok {
            StageOutcome::Succeeded
        } else {
            StageOutcome::Failed
        }
    }
}

/// Per-stage result of `run_pipeline`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub bronze: StageOutcome,
    pub silver: StageOutcome,
    pub gold: StageOutcome,
}

impl PipelineOutcome {
    /// True when every stage ran and succeeded
    pub fn succeeded(&self) -> bool {
        [self.bronze, self.silver, self.gold]
            .iter()
            .all(|stage| *stage == StageOutcome::Succeeded)
    }
}

/// Ingest `source`, promote to silver, then aggregate to gold
///
/// A failed stage skips every later stage.
pub async fn run_pipeline(
    source: &Path,
    paths: &StorePaths,
    reporter: &dyn Reporter,
) -> PipelineOutcome {
    let span = info_span!("pipeline", run_id = %Uuid::new_v4(), source = %source.display());

    async {
        let mut outcome = PipelineOutcome {
            bronze: StageOutcome::Skipped,
            silver: StageOutcome::Skipped,
            gold: StageOutcome::Skipped,
        };

        info!("Starting bronze layer ingestion");
        outcome.bronze = StageOutcome::from_success(
            lake_bronze::ingest_file(source, &paths.bronze, reporter).await,
        );
        if outcome.bronze != StageOutcome::Succeeded {
            warn!("Bronze ingestion failed; skipping silver and gold");
            return outcome;
        }

        info!("Starting silver layer processing");
        outcome.silver = StageOutcome::from_success(
            lake_silver::promote_files(&paths.bronze, &paths.silver, reporter).await,
        );
        if outcome.silver != StageOutcome::Succeeded {
            warn!("Silver processing failed; skipping gold");
            return outcome;
        }

        info!("Starting gold layer aggregation");
        outcome.gold = StageOutcome::from_success(
            lake_gold::aggregate_files(&paths.silver, &paths.gold, reporter).await,
        );

        if outcome.succeeded() {
            info!("Pipeline completed successfully");
        }
        outcome
    }
    .instrument(span)
    .await
}
