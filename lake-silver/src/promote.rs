//! Bronze → silver promotion
//!
//! `START → READ_BRONZE → (empty → NOOP) → READ_SILVER_KEYS → DIFF →
//! (no new keys → NOOP) → TRANSFORM → CREATE_SCHEMA → INSERT → DONE`.
//! Any fault before INSERT commits leaves silver untouched.

use crate::transform::to_silver;
use lake_common::db::{BronzeStore, SilverStore, TierStore};
use lake_common::{
    BronzeRecord, Error, PipelineEvent, Reporter, Result, SilverRecord, Stage,
};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

/// Outcome of one promotion run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromotionReport {
    /// Records present in bronze
    pub bronze_records: usize,
    /// Records appended to silver
    pub promoted: usize,
    /// Promoted records stored with a non-VALID verdict
    pub flagged: usize,
}

/// Promote new bronze records into silver using already open stores
///
/// Returns true on success, including the no-op cases.
pub async fn promote<B, S>(bronze: &B, silver: &S, reporter: &dyn Reporter) -> bool
where
    B: TierStore<Row = BronzeRecord>,
    S: TierStore<Row = SilverRecord>,
{
    let span = info_span!("silver_promote", run_id = %Uuid::new_v4());

    async {
        let result = run_promotion(bronze, silver, reporter).await;
        finish(result, reporter)
    }
    .instrument(span)
    .await
}

/// Promote from the bronze database at `bronze_db` into `silver_db`
///
/// Bronze is opened read-only. A missing bronze database is the same as an
/// empty one. Both stores are closed on every exit path.
pub async fn promote_files(bronze_db: &Path, silver_db: &Path, reporter: &dyn Reporter) -> bool {
    let span = info_span!("silver_promote", run_id = %Uuid::new_v4());

    async {
        if !bronze_db.exists() {
            return noop(reporter, "No records found in bronze layer");
        }

        let bronze = match BronzeStore::open_readonly(bronze_db).await {
            Ok(store) => store,
            Err(e) => return finish(Err(e), reporter),
        };

        let silver = match SilverStore::open(silver_db).await {
            Ok(store) => store,
            Err(e) => {
                bronze.close().await;
                return finish(Err(e), reporter);
            }
        };

        let result = run_promotion(&bronze, &silver, reporter).await;
        bronze.close().await;
        silver.close().await;
        finish(result, reporter)
    }
    .instrument(span)
    .await
}

/// Bronze records whose key is not in `existing`, in bronze order
pub fn new_records<'a>(
    bronze: &'a [BronzeRecord],
    existing: &HashSet<String>,
) -> Vec<&'a BronzeRecord> {
    bronze
        .iter()
        .filter(|record| !existing.contains(&record.transaction_id))
        .collect()
}

/// Run one promotion, propagating faults
pub async fn run_promotion<B, S>(
    bronze: &B,
    silver: &S,
    reporter: &dyn Reporter,
) -> Result<PromotionReport>
where
    B: TierStore<Row = BronzeRecord>,
    S: TierStore<Row = SilverRecord>,
{
    let bronze_rows = bronze.read_all().await?;
    if bronze_rows.is_empty() {
        noop(reporter, "No records found in bronze layer");
        return Ok(PromotionReport::default());
    }

    let existing = silver.read_keys().await?;
    let pending = new_records(&bronze_rows, &existing);
    debug!(
        bronze = bronze_rows.len(),
        existing = existing.len(),
        pending = pending.len(),
        "Computed promotion diff"
    );

    if pending.is_empty() {
        noop(reporter, "No new records to process");
        return Ok(PromotionReport {
            bronze_records: bronze_rows.len(),
            ..Default::default()
        });
    }

    // Transform everything before touching silver so a bad timestamp writes nothing
    let mut records = Vec::with_capacity(pending.len());
    let mut flagged = Vec::new();
    for record in pending {
        let (silver_record, violated) = to_silver(record)?;
        if !violated.is_empty() {
            flagged.push((
                silver_record.transaction_id.clone(),
                violated,
                silver_record.validation_status,
            ));
        }
        records.push(silver_record);
    }

    silver.create_schema().await?;
    let outcome = silver.insert_rows(&records).await?;

    for (transaction_id, violations, stored) in &flagged {
        reporter.report(PipelineEvent::RecordFlagged {
            transaction_id: transaction_id.clone(),
            violations: violations.clone(),
            stored: *stored,
        });
    }

    info!(
        "Successfully processed {} new records into silver layer.",
        outcome.inserted
    );
    reporter.report(PipelineEvent::StageCompleted {
        stage: Stage::Silver,
        records: outcome.inserted,
    });

    Ok(PromotionReport {
        bronze_records: bronze_rows.len(),
        promoted: outcome.inserted,
        flagged: flagged.len(),
    })
}

fn noop(reporter: &dyn Reporter, reason: &str) -> bool {
    info!("{}", reason);
    reporter.report(PipelineEvent::StageNoop {
        stage: Stage::Silver,
        reason: reason.to_string(),
    });
    true
}

fn finish(result: Result<PromotionReport>, reporter: &dyn Reporter) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            report_failure(&e, reporter);
            false
        }
    }
}

fn report_failure(err: &Error, reporter: &dyn Reporter) {
    error!("Silver layer processing failed: {}", err);
    reporter.report(PipelineEvent::StageFailed {
        stage: Stage::Silver,
        error: err.to_string(),
    });
}
