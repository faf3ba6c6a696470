//! Bronze Ingestor
//!
//! Reads a raw comma-separated transaction file, checks its header, coerces each
//! row, and appends the rows to the bronze store. Bad rows and duplicate keys are
//! reported and skipped; only a bad header or a store fault fails the run.

pub mod ingest;
pub mod source;

pub use ingest::{ingest, ingest_file, load_batch, IngestReport};
pub use source::{read_source, HeaderIndex, SourceBatch, REQUIRED_COLUMNS};
