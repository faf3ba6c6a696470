//! Table Schema Definitions
//!
//! Single source of truth for the three tier tables.

use crate::db::schema::{ColumnDefinition, TableSchema};

/// Raw ingested rows, keyed by transaction_id
pub struct BronzeTableSchema;

impl TableSchema for BronzeTableSchema {
    fn table_name() -> &'static str {
        "bronze_transactions"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("transaction_id", "TEXT").primary_key(),
            ColumnDefinition::new("customer_id", "TEXT"),
            ColumnDefinition::new("timestamp", "TEXT"),
            ColumnDefinition::new("amount", "REAL"),
            ColumnDefinition::new("transaction_type", "TEXT"),
            ColumnDefinition::new("merchant", "TEXT"),
            ColumnDefinition::new("category", "TEXT"),
            ColumnDefinition::new("status", "TEXT"),
        ]
    }
}

/// Promoted and annotated rows, keyed by transaction_id
pub struct SilverTableSchema;

impl TableSchema for SilverTableSchema {
    fn table_name() -> &'static str {
        "silver_transactions"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("transaction_id", "TEXT").primary_key(),
            ColumnDefinition::new("customer_id", "TEXT"),
            ColumnDefinition::new("transaction_date", "DATE"),
            ColumnDefinition::new("transaction_time", "TIME"),
            ColumnDefinition::new("amount", "REAL"),
            ColumnDefinition::new("transaction_type", "TEXT"),
            ColumnDefinition::new("merchant", "TEXT"),
            ColumnDefinition::new("category", "TEXT"),
            ColumnDefinition::new("status", "TEXT"),
            ColumnDefinition::new("validation_status", "TEXT").not_null(),
        ]
    }
}

/// Daily aggregates of VALID silver rows
pub struct GoldTableSchema;

impl TableSchema for GoldTableSchema {
    fn table_name() -> &'static str {
        "gold_daily_summary"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("summary_date", "DATE").primary_key(),
            ColumnDefinition::new("transaction_type", "TEXT").primary_key(),
            ColumnDefinition::new("category", "TEXT").primary_key(),
            ColumnDefinition::new("transaction_count", "INTEGER").not_null(),
            ColumnDefinition::new("total_amount", "REAL").not_null(),
            ColumnDefinition::new("avg_amount", "REAL").not_null(),
            ColumnDefinition::new("min_amount", "REAL").not_null(),
            ColumnDefinition::new("max_amount", "REAL").not_null(),
        ]
    }
}
