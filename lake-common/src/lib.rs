//! # Lake Common Library
//!
//! Shared code for the bronze/silver/gold pipeline stages:
//! - Error types and the row rejection vocabulary
//! - Configuration loading and store path resolution
//! - Tracing subscriber setup
//! - Pipeline events and the injected `Reporter`
//! - Transaction record models and timestamp parsing
//! - SQLite table schemas and the tier store capability interface

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod timestamp;

pub use error::{Error, RejectReason, Result, RowRejection};
pub use events::{CollectingReporter, PipelineEvent, Reporter, Stage, TracingReporter};
pub use models::{BronzeRecord, DailySummary, SilverRecord, ValidationStatus};
