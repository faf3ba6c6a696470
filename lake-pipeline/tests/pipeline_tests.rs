//! End-to-end tests over temporary tier databases

use lake_common::config::StorePaths;
use lake_common::db::{GoldStore, SilverStore, TierStore};
use lake_common::{CollectingReporter, PipelineEvent, Stage, ValidationStatus};
use lake_pipeline::{
    export_tier, handle_object_created, run_pipeline, tier_stats, StageOutcome, TierStats,
    TriggerFilter, TriggerOutcome,
};
use std::path::PathBuf;
use tempfile::TempDir;

const HEADER: &str =
    "transaction_id,customer_id,timestamp,amount,transaction_type,merchant,category,status";

fn write_csv(dir: &TempDir, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

fn sample_source(dir: &TempDir) -> PathBuf {
    write_csv(
        dir,
        "bronze_sample.csv",
        &[
            HEADER,
            "T1,CUST1,2024-01-01 10:00:00,10.50,purchase,StoreA,food,completed",
            "T2,CUST2,2024-01-01 10:05:00,-5.00,refund,StoreB,food,completed",
            "T3,NOPE3,2024-01-01 10:10:00,5.00,purchase,StoreC,food,completed",
            "T4,CUST4,2024-01-01 11:00:00,4.50,purchase,StoreA,food,completed",
        ],
    )
}

#[tokio::test]
async fn test_full_run_through_all_tiers() {
    let dir = TempDir::new().unwrap();
    let paths = StorePaths::in_folder(dir.path());
    let source = sample_source(&dir);
    let reporter = CollectingReporter::new();

    let outcome = run_pipeline(&source, &paths, &reporter).await;
    assert!(outcome.succeeded(), "{:?}", outcome);

    let silver = SilverStore::open_readonly(&paths.silver).await.unwrap();
    let statuses: Vec<ValidationStatus> = silver
        .read_all()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.validation_status)
        .collect();
    silver.close().await;
    assert_eq!(
        statuses,
        vec![
            ValidationStatus::Valid,
            ValidationStatus::NegativeAmount,
            ValidationStatus::InvalidCustomerId,
            ValidationStatus::Valid,
        ]
    );

    let gold = GoldStore::open_readonly(&paths.gold).await.unwrap();
    let summaries = gold.read_all().await.unwrap();
    gold.close().await;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].transaction_count, 2);
    assert_eq!(summaries[0].total_amount, 15.0);

    assert_eq!(
        tier_stats(&paths).await.unwrap(),
        TierStats {
            bronze: 4,
            silver: 4,
            gold: 1
        }
    );
}

#[tokio::test]
async fn test_rerun_same_file_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let paths = StorePaths::in_folder(dir.path());
    let source = sample_source(&dir);

    assert!(run_pipeline(&source, &paths, &CollectingReporter::new())
        .await
        .succeeded());
    let before = tier_stats(&paths).await.unwrap();

    let reporter = CollectingReporter::new();
    assert!(run_pipeline(&source, &paths, &reporter).await.succeeded());

    assert_eq!(tier_stats(&paths).await.unwrap(), before);
    assert_eq!(reporter.count("DuplicateSkipped"), 4);
    assert!(reporter.events().contains(&PipelineEvent::StageNoop {
        stage: Stage::Silver,
        reason: "No new records to process".to_string(),
    }));
}

#[tokio::test]
async fn test_schema_rejection_skips_later_stages() {
    let dir = TempDir::new().unwrap();
    let paths = StorePaths::in_folder(dir.path());
    let source = write_csv(
        &dir,
        "bronze_broken.csv",
        &["transaction_id,customer_id", "T1,CUST1"],
    );
    let reporter = CollectingReporter::new();

    let outcome = run_pipeline(&source, &paths, &reporter).await;
    assert_eq!(outcome.bronze, StageOutcome::Failed);
    assert_eq!(outcome.silver, StageOutcome::Skipped);
    assert_eq!(outcome.gold, StageOutcome::Skipped);
    assert!(!outcome.succeeded());

    assert_eq!(reporter.count("SchemaRejected"), 1);
    assert!(!paths.bronze.exists());
    assert!(!paths.silver.exists());
    assert_eq!(tier_stats(&paths).await.unwrap(), TierStats::default());
}

#[tokio::test]
async fn test_trigger_ignores_non_matching_object() {
    let dir = TempDir::new().unwrap();
    let paths = StorePaths::in_folder(dir.path());
    let object = write_csv(&dir, "notes.txt", &[HEADER]);
    let reporter = CollectingReporter::new();

    let outcome =
        handle_object_created(&object, &TriggerFilter::default(), &paths, &reporter).await;

    assert_eq!(outcome, TriggerOutcome::Ignored);
    assert_eq!(reporter.count("ObjectIgnored"), 1);
    assert!(!paths.bronze.exists());
}

#[tokio::test]
async fn test_trigger_runs_pipeline_for_matching_object() {
    let dir = TempDir::new().unwrap();
    let paths = StorePaths::in_folder(dir.path());
    let object = sample_source(&dir);
    let reporter = CollectingReporter::new();

    match handle_object_created(&object, &TriggerFilter::default(), &paths, &reporter).await {
        TriggerOutcome::Ran(outcome) => assert!(outcome.succeeded()),
        TriggerOutcome::Ignored => panic!("bronze_sample.csv should match the default filter"),
    }
}

#[tokio::test]
async fn test_export_writes_header_and_rows() {
    let dir = TempDir::new().unwrap();
    let paths = StorePaths::in_folder(dir.path());
    let source = sample_source(&dir);
    assert!(run_pipeline(&source, &paths, &CollectingReporter::new())
        .await
        .succeeded());

    let out = dir.path().join("exports").join("silver.csv");
    let rows = export_tier(Stage::Silver, &paths, &out).await.unwrap();
    assert_eq!(rows, 4);

    let text = std::fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("transaction_id,customer_id,transaction_date,transaction_time,amount,transaction_type,merchant,category,status,validation_status")
    );
    assert!(text.contains("INVALID: Negative amount"));
    assert_eq!(lines.count(), 4);
}

#[tokio::test]
async fn test_export_empty_tier_writes_no_file() {
    let dir = TempDir::new().unwrap();
    let paths = StorePaths::in_folder(dir.path());
    let out = dir.path().join("gold.csv");

    assert_eq!(export_tier(Stage::Gold, &paths, &out).await.unwrap(), 0);
    assert!(!out.exists());
}
