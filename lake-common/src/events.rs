//! Pipeline events and the injected reporter
//!
//! Stages never log outcomes through a hidden global. Each stage receives a
//! `&dyn Reporter` and emits `PipelineEvent`s; the binaries pass a
//! `TracingReporter`, tests pass a `CollectingReporter` and assert on the events.

use crate::error::RowRejection;
use crate::models::ValidationStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use tracing::{error, info, warn};

/// Pipeline tier a stage writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Bronze,
    Silver,
    Gold,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Bronze => "bronze",
            Stage::Silver => "silver",
            Stage::Gold => "gold",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline event types
///
/// Serializable so a reporter can forward them as structured records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    /// Source header failed validation; nothing was written
    SchemaRejected {
        stage: Stage,
        missing_columns: Vec<String>,
        detail: String,
    },

    /// A source row was skipped
    RowRejected {
        stage: Stage,
        line: u64,
        transaction_id: Option<String>,
        reason: String,
    },

    /// A row whose key already exists in the target store was skipped
    DuplicateSkipped {
        stage: Stage,
        transaction_id: String,
    },

    /// A promoted record failed one or more validation rules
    RecordFlagged {
        transaction_id: String,
        /// Every violated rule, in evaluation order
        violations: Vec<ValidationStatus>,
        /// The single verdict stored in silver
        stored: ValidationStatus,
    },

    /// Stage completed without writing anything
    StageNoop { stage: Stage, reason: String },

    /// Stage completed and appended `records` rows
    StageCompleted { stage: Stage, records: usize },

    /// Stage aborted; the caller sees `false`
    StageFailed { stage: Stage, error: String },

    /// A newly created object did not match the trigger filter
    ObjectIgnored { object: String },
}

impl PipelineEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            PipelineEvent::SchemaRejected { .. } => "SchemaRejected",
            PipelineEvent::RowRejected { .. } => "RowRejected",
            PipelineEvent::DuplicateSkipped { .. } => "DuplicateSkipped",
            PipelineEvent::RecordFlagged { .. } => "RecordFlagged",
            PipelineEvent::StageNoop { .. } => "StageNoop",
            PipelineEvent::StageCompleted { .. } => "StageCompleted",
            PipelineEvent::StageFailed { .. } => "StageFailed",
            PipelineEvent::ObjectIgnored { .. } => "ObjectIgnored",
        }
    }

    /// Build a `RowRejected` event from a rejection
    pub fn row_rejected(stage: Stage, rejection: &RowRejection) -> Self {
        PipelineEvent::RowRejected {
            stage,
            line: rejection.line,
            transaction_id: rejection.transaction_id.clone(),
            reason: rejection.reason.to_string(),
        }
    }
}

/// Sink for pipeline events
pub trait Reporter: Send + Sync {
    fn report(&self, event: PipelineEvent);
}

/// Forwards events to `tracing` at a level matching their severity
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: PipelineEvent) {
        match &event {
            PipelineEvent::SchemaRejected { stage, detail, .. } => {
                error!(%stage, "Source validation failed: {}", detail);
            }
            PipelineEvent::RowRejected {
                stage,
                line,
                transaction_id,
                reason,
            } => {
                error!(
                    %stage,
                    line,
                    transaction_id = transaction_id.as_deref().unwrap_or("-"),
                    "Row rejected: {}",
                    reason
                );
            }
            PipelineEvent::DuplicateSkipped {
                stage,
                transaction_id,
            } => {
                warn!(%stage, "Record {} already exists. Skipping insertion.", transaction_id);
            }
            PipelineEvent::RecordFlagged {
                transaction_id,
                violations,
                stored,
            } => {
                if violations.len() > 1 {
                    warn!(
                        "Record {} violates {} rules; stored verdict '{}'",
                        transaction_id,
                        violations.len(),
                        stored
                    );
                } else {
                    info!("Record {} flagged: {}", transaction_id, stored);
                }
            }
            PipelineEvent::StageNoop { stage, reason } => {
                info!(%stage, "No changes: {}", reason);
            }
            PipelineEvent::StageCompleted { stage, records } => {
                info!(%stage, "Stage completed: {} records written", records);
            }
            PipelineEvent::StageFailed { stage, error } => {
                error!(%stage, "Stage failed: {}", error);
            }
            PipelineEvent::ObjectIgnored { object } => {
                info!("Ignoring object {}", object);
            }
        }
    }
}

/// Keeps every event in memory, in emission order
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<PipelineEvent>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events reported so far
    pub fn events(&self) -> Vec<PipelineEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Events whose `event_type()` equals `event_type`
    pub fn events_of(&self, event_type: &str) -> Vec<PipelineEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn count(&self, event_type: &str) -> usize {
        self.events_of(event_type).len()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, event: PipelineEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
