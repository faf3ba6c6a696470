//! Common error types for the lake pipeline
//!
//! Run-level failures are `Error` values. Row-level problems are `RowRejection`
//! values: they are reported and skipped, never propagated.

use thiserror::Error;

/// Common result type for lake operations
pub type Result<T> = std::result::Result<T, Error>;

/// Run-level error types shared by every stage
#[derive(Error, Debug)]
pub enum Error {
    /// Store read, write or commit failure (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Source file could not be read as delimited text
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Source file has no header row
    #[error("Source file is empty or has no header row")]
    EmptyHeader,

    /// Source header lacks required fields
    #[error("Source file is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Bronze timestamp cannot be split into date and time
    #[error("Invalid timestamp '{value}' for transaction {transaction_id}")]
    InvalidTimestamp {
        transaction_id: String,
        value: String,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for header problems detected before any store access
    pub fn is_schema_validation(&self) -> bool {
        matches!(self, Error::EmptyHeader | Error::MissingColumns(_))
    }
}

/// Why a single source row was skipped
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// A required field is absent or blank
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// Amount cannot be coerced to a number
    #[error("amount '{0}' is not a number")]
    InvalidAmount(String),

    /// Timestamp cannot be split into date and time of day
    #[error("timestamp '{0}' is not a valid date/time")]
    InvalidTimestamp(String),

    /// Row could not be decoded at all
    #[error("malformed row: {0}")]
    Malformed(String),
}

/// A source row rejected during ingestion
#[derive(Debug, Clone, PartialEq)]
pub struct RowRejection {
    /// 1-based line number in the source file (header is line 1)
    pub line: u64,
    /// Transaction id, when the row carried one
    pub transaction_id: Option<String>,
    pub reason: RejectReason,
}

impl std::fmt::Display for RowRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.transaction_id {
            Some(id) => write!(f, "line {} ({}): {}", self.line, id, self.reason),
            None => write!(f, "line {}: {}", self.line, self.reason),
        }
    }
}
