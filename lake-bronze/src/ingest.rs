//! Bronze ingestion
//!
//! `START → VALIDATE_SOURCE → CREATE_SCHEMA → INSERT_ROWS → COMMIT → DONE`, or
//! `FAIL` when the header is invalid (before any store access) or the store faults.

use crate::source::{read_source, SourceBatch};
use lake_common::db::{BronzeStore, TierStore};
use lake_common::{
    BronzeRecord, Error, PipelineEvent, Reporter, Result, RowRejection, Stage,
};
use std::path::Path;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Outcome of one ingestion run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Rows appended to bronze
    pub inserted: usize,
    /// Keys skipped because they were already in bronze (or repeated in the file)
    pub duplicates: Vec<String>,
    /// Rows skipped because they could not be coerced
    pub rejected: Vec<RowRejection>,
}

/// Ingest `source` into an already open bronze store
///
/// Returns true unless the header is invalid or the store faults.
pub async fn ingest<S>(source: &Path, store: &S, reporter: &dyn Reporter) -> bool
where
    S: TierStore<Row = BronzeRecord>,
{
    let span = info_span!("bronze_ingest", run_id = %Uuid::new_v4(), source = %source.display());

    async {
        let result = match read_source(source) {
            Ok(batch) => load_batch(batch, store, reporter).await,
            Err(e) => Err(e),
        };
        finish(result, reporter)
    }
    .instrument(span)
    .await
}

/// Ingest `source` into the bronze database at `db_path`
///
/// The header is validated before the database is opened, so an invalid file
/// leaves no trace in the store. The store is closed on every exit path.
pub async fn ingest_file(source: &Path, db_path: &Path, reporter: &dyn Reporter) -> bool {
    let span = info_span!("bronze_ingest", run_id = %Uuid::new_v4(), source = %source.display());

    async {
        info!("Ingesting data from: {}", source.display());
        info!("Saving database to: {}", db_path.display());

        let batch = match read_source(source) {
            Ok(batch) => batch,
            Err(e) => return finish(Err(e), reporter),
        };

        let store = match BronzeStore::open(db_path).await {
            Ok(store) => store,
            Err(e) => return finish(Err(e), reporter),
        };

        let result = load_batch(batch, &store, reporter).await;
        store.close().await;
        finish(result, reporter)
    }
    .instrument(span)
    .await
}

/// Append a coerced batch to bronze in one transaction
///
/// Row rejections and duplicate keys are reported, never fatal.
pub async fn load_batch<S>(
    batch: SourceBatch,
    store: &S,
    reporter: &dyn Reporter,
) -> Result<IngestReport>
where
    S: TierStore<Row = BronzeRecord>,
{
    for rejection in &batch.rejected {
        reporter.report(PipelineEvent::row_rejected(Stage::Bronze, rejection));
    }

    store.create_schema().await?;
    let outcome = store.insert_rows(&batch.records).await?;

    for transaction_id in &outcome.duplicates {
        reporter.report(PipelineEvent::DuplicateSkipped {
            stage: Stage::Bronze,
            transaction_id: transaction_id.clone(),
        });
    }

    info!(
        "Successfully ingested {} records into bronze layer.",
        outcome.inserted
    );
    reporter.report(PipelineEvent::StageCompleted {
        stage: Stage::Bronze,
        records: outcome.inserted,
    });

    Ok(IngestReport {
        inserted: outcome.inserted,
        duplicates: outcome.duplicates,
        rejected: batch.rejected,
    })
}

fn finish(result: Result<IngestReport>, reporter: &dyn Reporter) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            report_failure(&e, reporter);
            false
        }
    }
}

fn report_failure(err: &Error, reporter: &dyn Reporter) {
    error!("Bronze layer ingestion failed: {}", err);
    let event = if err.is_schema_validation() {
        let missing_columns = match err {
            Error::MissingColumns(missing) => missing.clone(),
            _ => Vec::new(),
        };
        PipelineEvent::SchemaRejected {
            stage: Stage::Bronze,
            missing_columns,
            detail: err.to_string(),
        }
    } else {
        PipelineEvent::StageFailed {
            stage: Stage::Bronze,
            error: err.to_string(),
        }
    };
    reporter.report(event);
}
