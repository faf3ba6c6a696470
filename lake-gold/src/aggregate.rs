//! Silver → gold aggregation

use crate::summary::summarize;
use lake_common::db::{GoldStore, SilverStore, TierStore};
use lake_common::{DailySummary, Error, PipelineEvent, Reporter, Result, SilverRecord, Stage};
use std::path::Path;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Outcome of one aggregation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationReport {
    /// Silver records read
    pub silver_records: usize,
    /// Summary rows written (inserted or replaced)
    pub summaries: usize,
}

/// Recompute gold from an open silver store
pub async fn aggregate<S, G>(silver: &S, gold: &G, reporter: &dyn Reporter) -> bool
where
    S: TierStore<Row = SilverRecord>,
    G: TierStore<Row = DailySummary>,
{
    let span = info_span!("gold_aggregate", run_id = %Uuid::new_v4());

    async {
        let result = run_aggregation(silver, gold, reporter).await;
        finish(result, reporter)
    }
    .instrument(span)
    .await
}

/// Recompute gold at `gold_db` from the silver database at `silver_db`
///
/// Silver is opened read-only; a missing silver database aggregates nothing.
pub async fn aggregate_files(silver_db: &Path, gold_db: &Path, reporter: &dyn Reporter) -> bool {
    let span = info_span!("gold_aggregate", run_id = %Uuid::new_v4());

    async {
        if !silver_db.exists() {
            return noop(reporter);
        }

        let silver = match SilverStore::open_readonly(silver_db).await {
            Ok(store) => store,
            Err(e) => return finish(Err(e), reporter),
        };

        let gold = match GoldStore::open(gold_db).await {
            Ok(store) => store,
            Err(e) => {
                silver.close().await;
                return finish(Err(e), reporter);
            }
        };

        let result = run_aggregation(&silver, &gold, reporter).await;
        silver.close().await;
        gold.close().await;
        finish(result, reporter)
    }
    .instrument(span)
    .await
}

/// Run one aggregation, propagating faults
pub async fn run_aggregation<S, G>(
    silver: &S,
    gold: &G,
    reporter: &dyn Reporter,
) -> Result<AggregationReport>
where
    S: TierStore<Row = SilverRecord>,
    G: TierStore<Row = DailySummary>,
{
    let records = silver.read_all().await?;
    let summaries = summarize(&records);

    if summaries.is_empty() {
        noop(reporter);
        return Ok(AggregationReport {
            silver_records: records.len(),
            summaries: 0,
        });
    }

    gold.create_schema().await?;
    let outcome = gold.insert_rows(&summaries).await?;

    info!(
        "Successfully aggregated {} records into gold layer.",
        outcome.inserted
    );
    reporter.report(PipelineEvent::StageCompleted {
        stage: Stage::Gold,
        records: outcome.inserted,
    });

    Ok(AggregationReport {
        silver_records: records.len(),
        summaries: outcome.inserted,
    })
}

fn noop(reporter: &dyn Reporter) -> bool {
    info!("No new data to aggregate for gold layer.");
    reporter.report(PipelineEvent::StageNoop {
        stage: Stage::Gold,
        reason: "No valid silver records to aggregate".to_string(),
    });
    true
}

fn finish(result: Result<AggregationReport>, reporter: &dyn Reporter) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            report_failure(&e, reporter);
            false
        }
    }
}

fn report_failure(err: &Error, reporter: &dyn Reporter) {
    error!("Error during gold layer aggregation: {}", err);
    reporter.report(PipelineEvent::StageFailed {
        stage: Stage::Gold,
        error: err.to_string(),
    });
}
