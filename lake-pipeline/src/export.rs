//! CSV export of a tier table

use lake_common::config::StorePaths;
use lake_common::db::{SqliteStore, TierRecord, TierStore};
use lake_common::{BronzeRecord, DailySummary, Result, SilverRecord, Stage};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Write every row of `tier` to `out` as CSV with a header row
///
/// Returns the number of rows written. An empty or missing table writes no
/// file and returns 0.
pub async fn export_tier(tier: Stage, paths: &StorePaths, out: &Path) -> Result<usize> {
    match tier {
        Stage::Bronze => export_store::<BronzeRecord>(&paths.bronze, out).await,
        Stage::Silver => export_store::<SilverRecord>(&paths.silver, out).await,
        Stage::Gold => export_store::<DailySummary>(&paths.gold, out).await,
    }
}

async fn export_store<R>(db_path: &Path, out: &Path) -> Result<usize>
where
    R: TierRecord + Serialize,
{
    let rows = if db_path.exists() {
        let store = SqliteStore::<R>::open_readonly(db_path).await?;
        let rows = store.read_all().await;
        store.close().await;
        rows?
    } else {
        Vec::new()
    };

    if rows.is_empty() {
        warn!("No data found in {}; nothing exported", db_path.display());
        return Ok(0);
    }

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(out)?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!("Exported {} rows to {}", rows.len(), out.display());
    Ok(rows.len())
}
