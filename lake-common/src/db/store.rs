//! Tier store capability interface
//!
//! Stages only see `TierStore`: create the schema, append a batch, read every
//! row, read every key. `SqliteStore<R>` implements it for any `TierRecord`,
//! so the promotion logic does not depend on where a tier lives.

use crate::db::init::{open_memory_pool, open_pool, open_pool_readonly};
use crate::db::schema::{create_table, SchemaIntrospector, TableSchema};
use crate::db::table_schemas::{BronzeTableSchema, GoldTableSchema, SilverTableSchema};
use crate::models::{BronzeRecord, DailySummary, SilverRecord, ValidationStatus};
use crate::{Error, Result};
use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqliteRow};
use sqlx::Row;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::path::Path;
use tracing::debug;

/// Query type passed to `TierRecord::bind_values`
pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Separator between parts of a composite key
pub const KEY_SEPARATOR: &str = "|";

/// What `insert_rows` does when a row's key already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Leave the existing row, report the key as a duplicate
    Skip,
    /// Fail the whole batch
    Reject,
    /// Overwrite the existing row
    Replace,
}

impl ConflictPolicy {
    fn insert_verb(&self) -> &'static str {
        match self {
            ConflictPolicy::Skip => "INSERT OR IGNORE",
            ConflictPolicy::Reject => "INSERT",
            ConflictPolicy::Replace => "INSERT OR REPLACE",
        }
    }
}

/// Result of one `insert_rows` batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertOutcome {
    /// Rows written (inserted or replaced)
    pub inserted: usize,
    /// Keys skipped because they already existed (`ConflictPolicy::Skip` only)
    pub duplicates: Vec<String>,
}

/// A record type stored in one tier table
pub trait TierRecord: Sized + Send + Sync + 'static {
    type Schema: TableSchema;

    /// Conflict handling for this tier
    const CONFLICT: ConflictPolicy;

    /// Primary key; composite keys are joined with `KEY_SEPARATOR`
    fn key(&self) -> String;

    /// Bind values in `Schema::expected_columns()` order
    fn bind_values<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;

    /// Decode one row selected with `Schema::column_list()`
    fn from_row(row: &SqliteRow) -> Result<Self>;
}

/// Minimal store capability needed by every stage
#[async_trait]
pub trait TierStore: Send + Sync {
    type Row: Send + Sync;

    /// Create the backing table if absent (idempotent)
    async fn create_schema(&self) -> Result<()>;

    /// Append a batch in one transaction
    async fn insert_rows(&self, rows: &[Self::Row]) -> Result<InsertOutcome>;

    /// Every row, in insertion order; empty when the table does not exist
    async fn read_all(&self) -> Result<Vec<Self::Row>>;

    /// Every primary key; empty when the table does not exist
    async fn read_keys(&self) -> Result<HashSet<String>>;
}

/// SQLite-backed tier store
pub struct SqliteStore<R> {
    pool: SqlitePool,
    location: String,
    _record: PhantomData<fn() -> R>,
}

pub type BronzeStore = SqliteStore<BronzeRecord>;
pub type SilverStore = SqliteStore<SilverRecord>;
pub type GoldStore = SqliteStore<DailySummary>;

impl<R: TierRecord> SqliteStore<R> {
    /// Open (creating if needed) the database file at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = open_pool(db_path).await?;
        Ok(Self::with_location(pool, db_path.display().to_string()))
    }

    /// Open an existing database file without write access
    pub async fn open_readonly(db_path: &Path) -> Result<Self> {
        let pool = open_pool_readonly(db_path).await?;
        Ok(Self::with_location(pool, db_path.display().to_string()))
    }

    /// Private in-memory store
    pub async fn in_memory() -> Result<Self> {
        let pool = open_memory_pool().await?;
        Ok(Self::with_location(pool, ":memory:".to_string()))
    }

    fn with_location(pool: SqlitePool, location: String) -> Self {
        Self {
            pool,
            location,
            _record: PhantomData,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn table_name(&self) -> &'static str {
        R::Schema::table_name()
    }

    pub async fn table_exists(&self) -> Result<bool> {
        SchemaIntrospector::table_exists(&self.pool, R::Schema::table_name()).await
    }

    /// Row count; 0 when the table does not exist
    pub async fn count(&self) -> Result<i64> {
        if !self.table_exists().await? {
            return Ok(0);
        }
        let sql = format!("SELECT COUNT(*) FROM {}", R::Schema::table_name());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Release the connection
    pub async fn close(self) {
        self.pool.close().await;
        debug!("Closed store {}", self.location);
    }
}

#[async_trait]
impl<R: TierRecord> TierStore for SqliteStore<R> {
    type Row = R;

    async fn create_schema(&self) -> Result<()> {
        create_table::<R::Schema>(&self.pool).await
    }

    async fn insert_rows(&self, rows: &[R]) -> Result<InsertOutcome> {
        let columns = R::Schema::expected_columns();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "{} INTO {} ({}) VALUES ({})",
            R::CONFLICT.insert_verb(),
            R::Schema::table_name(),
            R::Schema::column_list(),
            placeholders
        );

        let mut outcome = InsertOutcome::default();

        // Dropping `tx` on an early return rolls the batch back
        let mut tx = self.pool.begin().await?;
        for row in rows {
            let result = row.bind_values(sqlx::query(&sql)).execute(&mut *tx).await?;
            if result.rows_affected() == 0 {
                outcome.duplicates.push(row.key());
            } else {
                outcome.inserted += 1;
            }
        }
        tx.commit().await?;

        Ok(outcome)
    }

    async fn read_all(&self) -> Result<Vec<R>> {
        if !self.table_exists().await? {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM {} ORDER BY rowid",
            R::Schema::column_list(),
            R::Schema::table_name()
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(R::from_row).collect()
    }

    async fn read_keys(&self) -> Result<HashSet<String>> {
        if !self.table_exists().await? {
            return Ok(HashSet::new());
        }

        let key_columns = R::Schema::key_columns();
        let sql = format!(
            "SELECT {} FROM {}",
            key_columns.join(", "),
            R::Schema::table_name()
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut keys = HashSet::with_capacity(rows.len());
        for row in &rows {
            let parts = (0..key_columns.len())
                .map(|idx| row.try_get::<String, _>(idx))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            keys.insert(parts.join(KEY_SEPARATOR));
        }
        Ok(keys)
    }
}

impl TierRecord for BronzeRecord {
    type Schema = BronzeTableSchema;
    const CONFLICT: ConflictPolicy = ConflictPolicy::Skip;

    fn key(&self) -> String {
        self.transaction_id.clone()
    }

    fn bind_values<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.transaction_id.as_str())
            .bind(self.customer_id.as_deref())
            .bind(self.timestamp.as_str())
            .bind(self.amount)
            .bind(self.transaction_type.as_str())
            .bind(self.merchant.as_deref())
            .bind(self.category.as_deref())
            .bind(self.status.as_str())
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            transaction_id: row.try_get("transaction_id")?,
            customer_id: row.try_get("customer_id")?,
            timestamp: row.try_get("timestamp")?,
            amount: row.try_get("amount")?,
            transaction_type: row.try_get("transaction_type")?,
            merchant: row.try_get("merchant")?,
            category: row.try_get("category")?,
            status: row.try_get("status")?,
        })
    }
}

impl TierRecord for SilverRecord {
    type Schema = SilverTableSchema;
    const CONFLICT: ConflictPolicy = ConflictPolicy::Reject;

    fn key(&self) -> String {
        self.transaction_id.clone()
    }

    fn bind_values<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.transaction_id.as_str())
            .bind(self.customer_id.as_deref())
            .bind(self.transaction_date.as_str())
            .bind(self.transaction_time.as_str())
            .bind(self.amount)
            .bind(self.transaction_type.as_str())
            .bind(self.merchant.as_deref())
            .bind(self.category.as_deref())
            .bind(self.status.as_str())
            .bind(self.validation_status.as_str())
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        let status: String = row.try_get("validation_status")?;
        let validation_status = status.parse::<ValidationStatus>().map_err(Error::Internal)?;

        Ok(Self {
            transaction_id: row.try_get("transaction_id")?,
            customer_id: row.try_get("customer_id")?,
            transaction_date: row.try_get("transaction_date")?,
            transaction_time: row.try_get("transaction_time")?,
            amount: row.try_get("amount")?,
            transaction_type: row.try_get("transaction_type")?,
            merchant: row.try_get("merchant")?,
            category: row.try_get("category")?,
            status: row.try_get("status")?,
            validation_status,
        })
    }
}

impl TierRecord for DailySummary {
    type Schema = GoldTableSchema;
    const CONFLICT: ConflictPolicy = ConflictPolicy::Replace;

    fn key(&self) -> String {
        [
            self.summary_date.as_str(),
            self.transaction_type.as_str(),
            self.category.as_str(),
        ]
        .join(KEY_SEPARATOR)
    }

    fn bind_values<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.summary_date.as_str())
            .bind(self.transaction_type.as_str())
            .bind(self.category.as_str())
            .bind(self.transaction_count)
            .bind(self.total_amount)
            .bind(self.avg_amount)
            .bind(self.min_amount)
            .bind(self.max_amount)
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            summary_date: row.try_get("summary_date")?,
            transaction_type: row.try_get("transaction_type")?,
            category: row.try_get("category")?,
            transaction_count: row.try_get("transaction_count")?,
            total_amount: row.try_get("total_amount")?,
            avg_amount: row.try_get("avg_amount")?,
            min_amount: row.try_get("min_amount")?,
            max_amount: row.try_get("max_amount")?,
        })
    }
}
