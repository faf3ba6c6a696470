//! Gold aggregation
//!
//! Daily summaries of VALID silver records per (date, transaction type, category).

pub mod aggregate;
pub mod summary;

pub use aggregate::{aggregate, aggregate_files, run_aggregation, AggregationReport};
pub use summary::{summarize, UNCATEGORIZED};
