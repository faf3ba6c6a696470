//! Object-created notifications
//!
//! Only objects whose file name carries the configured prefix and suffix start
//! a pipeline run; everything else is reported and ignored.

use crate::run::{run_pipeline, PipelineOutcome};
use lake_common::config::{StorePaths, TriggerConfig};
use lake_common::{PipelineEvent, Reporter};
use std::path::Path;

/// Prefix/suffix filter applied to the object's file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerFilter {
    pub prefix: String,
    pub suffix: String,
}

impl TriggerFilter {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn matches(&self, object: &Path) -> bool {
        object
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(&self.prefix) && name.ends_with(&self.suffix))
    }
}

impl Default for TriggerFilter {
    fn default() -> Self {
        Self::from(&TriggerConfig::default())
    }
}

impl From<&TriggerConfig> for TriggerFilter {
    fn from(config: &TriggerConfig) -> Self {
        Self::new(config.prefix.clone(), config.suffix.clone())
    }
}

/// What `handle_object_created` did with an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Ignored,
    Ran(PipelineOutcome),
}

/// Run the pipeline for `object` if it passes `filter`
pub async fn handle_object_created(
    object: &Path,
    filter: &TriggerFilter,
    paths: &StorePaths,
    reporter: &dyn Reporter,
) -> TriggerOutcome {
    if !filter.matches(object) {
        reporter.report(PipelineEvent::ObjectIgnored {
            object: object.display().to_string(),
        });
        return TriggerOutcome::Ignored;
    }

    TriggerOutcome::Ran(run_pipeline(object, paths, reporter).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let filter = TriggerFilter::default();
        assert!(filter.matches(Path::new("/landing/bronze_2024-01-01.csv")));
        assert!(!filter.matches(Path::new("/landing/silver_2024-01-01.csv")));
        assert!(!filter.matches(Path::new("/landing/bronze_2024-01-01.json")));
    }

    #[test]
    fn test_prefix_checked_against_file_name_only() {
        let filter = TriggerFilter::new("bronze_", ".csv");
        assert!(!filter.matches(Path::new("/bronze_dir/other.csv")));
        assert!(!filter.matches(Path::new("/")));
    }
}
