//! Bronze → silver → gold orchestration
//!
//! Runs the three stages in order for one arriving file, filters object-created
//! notifications, and offers read-only inspection of the tier stores.

pub mod export;
pub mod run;
pub mod stats;
pub mod trigger;

pub use export::export_tier;
pub use run::{run_pipeline, PipelineOutcome, StageOutcome};
pub use stats::{tier_stats, TierStats};
pub use trigger::{handle_object_created, TriggerFilter, TriggerOutcome};
