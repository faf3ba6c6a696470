//! Declarative table schemas
//!
//! Each tier table is described once as a list of `ColumnDefinition`s. The same
//! definition drives `CREATE TABLE IF NOT EXISTS`, the INSERT statement, the
//! SELECT column list, and the compatibility check against an existing table.
//!
//! # Usage
//!
//! ```rust,ignore
//! pub struct BronzeTableSchema;
//!
//! impl TableSchema for BronzeTableSchema {
//!     fn table_name() -> &'static str { "bronze_transactions" }
//!
//!     fn expected_columns() -> Vec<ColumnDefinition> {
//!         vec![
//!             ColumnDefinition::new("transaction_id", "TEXT").primary_key(),
//!             ColumnDefinition::new("amount", "REAL"),
//!         ]
//!     }
//! }
//!
//! create_table::<BronzeTableSchema>(&pool).await?;
//! ```

use crate::{Error, Result};
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// SQL type (e.g., "TEXT", "INTEGER", "REAL", "DATE")
    pub sql_type: String,
    /// NOT NULL constraint
    pub not_null: bool,
    /// Part of the PRIMARY KEY
    pub primary_key: bool,
}

impl ColumnDefinition {
    /// Create new column definition
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
        }
    }

    /// Mark column as (part of) the PRIMARY KEY
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark column as NOT NULL
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }
}

/// Actual column from database introspection (PRAGMA table_info result)
#[derive(Debug, Clone)]
pub struct ActualColumn {
    /// Column ID (position in table)
    pub cid: i32,
    /// Column name
    pub name: String,
    /// SQL type from PRAGMA table_info
    pub type_name: String,
    /// Position in the primary key (0 = not part of it)
    pub pk: i32,
}

/// Incompatibility between a definition and an existing table
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDrift {
    /// Column missing from database
    MissingColumn { table: String, column: String },
    /// Column type mismatch
    TypeMismatch {
        table: String,
        column: String,
        expected: String,
        actual: String,
    },
    /// Expected key column is not part of the table's primary key
    KeyMismatch { table: String, column: String },
}

impl std::fmt::Display for SchemaDrift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaDrift::MissingColumn { table, column } => {
                write!(f, "{}.{} is missing", table, column)
            }
            SchemaDrift::TypeMismatch {
                table,
                column,
                expected,
                actual,
            } => write!(
                f,
                "{}.{} has type '{}', expected '{}'",
                table, column, actual, expected
            ),
            SchemaDrift::KeyMismatch { table, column } => {
                write!(f, "{}.{} is not part of the primary key", table, column)
            }
        }
    }
}

/// Defines expected schema for a database table
pub trait TableSchema {
    /// Table name in database
    fn table_name() -> &'static str;

    /// Expected column definitions (order matters for table creation and INSERT binding)
    fn expected_columns() -> Vec<ColumnDefinition>;

    /// Primary key column names, in definition order
    fn key_columns() -> Vec<String> {
        Self::expected_columns()
            .into_iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name)
            .collect()
    }

    /// Comma-separated column list in definition order
    fn column_list() -> String {
        Self::expected_columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this table
    fn create_table_sql() -> String {
        let columns = Self::expected_columns();
        let mut lines: Vec<String> = columns
            .iter()
            .map(|c| {
                if c.not_null {
                    format!("    {} {} NOT NULL", c.name, c.sql_type)
                } else {
                    format!("    {} {}", c.name, c.sql_type)
                }
            })
            .collect();

        let keys = Self::key_columns();
        if !keys.is_empty() {
            lines.push(format!("    PRIMARY KEY ({})", keys.join(", ")));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            Self::table_name(),
            lines.join(",\n")
        )
    }
}

/// Schema introspection - read actual database schema
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// Read actual columns from database table using PRAGMA table_info
    ///
    /// Returns columns in database order (by cid)
    pub async fn introspect_table(pool: &SqlitePool, table_name: &str) -> Result<Vec<ActualColumn>> {
        let query = format!("PRAGMA table_info({})", table_name);
        let rows = sqlx::query(&query).fetch_all(pool).await?;

        let mut columns = rows
            .iter()
            .map(|row| {
                Ok(ActualColumn {
                    cid: row.try_get("cid")?,
                    name: row.try_get("name")?,
                    type_name: row.try_get("type")?,
                    pk: row.try_get("pk")?,
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;

        columns.sort_by_key(|c| c.cid);
        Ok(columns)
    }

    /// Check if table exists
    pub async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM sqlite_master
                WHERE type='table' AND name = ?
            )
            "#,
        )
        .bind(table_name)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }
}

/// Schema comparison - detect drift between expected and actual
pub struct SchemaDiff;

impl SchemaDiff {
    /// Compare expected schema to actual database schema
    pub fn compare(
        table_name: &str,
        expected: &[ColumnDefinition],
        actual: &[ActualColumn],
    ) -> Vec<SchemaDrift> {
        let mut drift = Vec::new();

        for expected_col in expected {
            match actual.iter().find(|c| c.name == expected_col.name) {
                Some(actual_col) => {
                    if !Self::types_compatible(&expected_col.sql_type, &actual_col.type_name) {
                        drift.push(SchemaDrift::TypeMismatch {
                            table: table_name.to_string(),
                            column: expected_col.name.clone(),
                            expected: expected_col.sql_type.clone(),
                            actual: actual_col.type_name.clone(),
                        });
                    }
                    if expected_col.primary_key && actual_col.pk == 0 {
                        drift.push(SchemaDrift::KeyMismatch {
                            table: table_name.to_string(),
                            column: expected_col.name.clone(),
                        });
                    }
                }
                None => drift.push(SchemaDrift::MissingColumn {
                    table: table_name.to_string(),
                    column: expected_col.name.clone(),
                }),
            }
        }

        drift
    }

    /// Check if SQL types are compatible (SQLite type affinity rules)
    fn types_compatible(expected: &str, actual: &str) -> bool {
        let exp = expected.to_uppercase();
        let act = actual.to_uppercase();

        if exp == act {
            return true;
        }

        let is_int = |t: &str| t.contains("INT");
        let is_text = |t: &str| t.contains("TEXT") || t.contains("CHAR") || t.contains("CLOB");
        let is_real = |t: &str| t.contains("REAL") || t.contains("FLOA") || t.contains("DOUB");

        (is_int(&exp) && is_int(&act))
            || (is_text(&exp) && is_text(&act))
            || (is_real(&exp) && is_real(&act))
    }
}

/// Create the table if absent, then check an existing table is compatible
///
/// Idempotent. A pre-existing table that lacks expected columns or keys fails
/// with `Error::Internal` rather than being altered.
pub async fn create_table<T: TableSchema>(pool: &SqlitePool) -> Result<()> {
    let table_name = T::table_name();

    sqlx::query(&T::create_table_sql()).execute(pool).await?;

    let actual = SchemaIntrospector::introspect_table(pool, table_name).await?;
    let drift = SchemaDiff::compare(table_name, &T::expected_columns(), &actual);

    if drift.is_empty() {
        debug!("Table '{}' ready", table_name);
        return Ok(());
    }

    for item in &drift {
        warn!("Schema drift: {}", item);
    }
    Err(Error::Internal(format!(
        "Table '{}' is incompatible: {}",
        table_name,
        drift
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    )))
}
