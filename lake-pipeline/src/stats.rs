//! Row counts per tier

use lake_common::config::StorePaths;
use lake_common::db::{SqliteStore, TierRecord};
use lake_common::{BronzeRecord, DailySummary, Result, SilverRecord};
use std::fmt;
use std::path::Path;

/// Number of rows in each tier table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierStats {
    pub bronze: i64,
    pub silver: i64,
    pub gold: i64,
}

impl fmt::Display for TierStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "bronze: {} records", self.bronze)?;
        writeln!(f, "silver: {} records", self.silver)?;
        write!(f, "gold:   {} records", self.gold)
    }
}

/// Count rows in all three stores; missing databases and tables count as 0
pub async fn tier_stats(paths: &StorePaths) -> Result<TierStats> {
    Ok(TierStats {
        bronze: count_rows::<BronzeRecord>(&paths.bronze).await?,
        silver: count_rows::<SilverRecord>(&paths.silver).await?,
        gold: count_rows::<DailySummary>(&paths.gold).await?,
    })
}

async fn count_rows<R: TierRecord>(db_path: &Path) -> Result<i64> {
    if !db_path.exists() {
        return Ok(0);
    }
    let store = SqliteStore::<R>::open_readonly(db_path).await?;
    let count = store.count().await;
    store.close().await;
    count
}
