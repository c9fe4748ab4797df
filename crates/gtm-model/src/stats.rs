use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::{ResourceCounts, ResourceKind};

/// Outcome of a finalized creation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Success,
    PartialSuccess,
    #[default]
    Failed,
}

impl RunStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::PartialSuccess => "PARTIAL_SUCCESS",
            Self::Failed => "FAILED",
        }
    }

    /// Classifies a run from what was requested, created and recorded as failed.
    pub fn classify(requested: ResourceCounts, created: ResourceCounts, errors: usize) -> Self {
        if created.total() == requested.total() && errors == 0 {
            Self::Success
        } else if created.total() > 0 {
            Self::PartialSuccess
        } else {
            Self::Failed
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated result of one orchestration run.
///
/// Starts as `FAILED`, is updated as each resource is attempted and is
/// classified exactly once by [`CreationStats::finalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationStats {
    pub requested: ResourceCounts,
    pub created: ResourceCounts,
    pub errors: Vec<String>,
    pub status: RunStatus,
}

impl CreationStats {
    pub fn new(requested: ResourceCounts) -> Self {
        Self {
            requested,
            ..Self::default()
        }
    }

    pub fn record_created(&mut self, kind: ResourceKind) {
        self.created.increment(kind);
    }

    /// Records a per-resource failure message.
    pub fn record_failure(&mut self, kind: ResourceKind, name: &str, cause: impl fmt::Display) {
        self.errors
            .push(format!("Failed to create {kind} '{name}': {cause}"));
    }

    /// Number of resources of `kind` that were attempted and not created.
    pub fn failed(&self, kind: ResourceKind) -> usize {
        self.requested.get(kind).saturating_sub(self.created.get(kind))
    }

    #[must_use]
    pub fn finalize(mut self) -> Self {
        self.status = RunStatus::classify(self.requested, self.created, self.errors.len());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_created_is_success() {
        let counts = ResourceCounts::new(2, 2, 3);
        assert_eq!(RunStatus::classify(counts, counts, 0), RunStatus::Success);
    }

    #[test]
    fn test_some_created_is_partial() {
        let requested = ResourceCounts::new(1, 2, 2);
        let created = ResourceCounts::new(1, 1, 2);
        assert_eq!(
            RunStatus::classify(requested, created, 1),
            RunStatus::PartialSuccess
        );
    }

    #[test]
    fn test_nothing_created_is_failed() {
        let requested = ResourceCounts::new(1, 1, 1);
        assert_eq!(
            RunStatus::classify(requested, ResourceCounts::default(), 3),
            RunStatus::Failed
        );
    }

    #[test]
    fn test_empty_request_is_success() {
        let empty = ResourceCounts::default();
        assert_eq!(RunStatus::classify(empty, empty, 0), RunStatus::Success);
    }

    #[test]
    fn test_failure_message_format() {
        let mut stats = CreationStats::new(ResourceCounts::new(1, 0, 0));
        stats.record_failure(ResourceKind::Variable, "Page Path", "HTTP 400: bad request");
        assert_eq!(
            stats.errors,
            vec!["Failed to create variable 'Page Path': HTTP 400: bad request".to_string()]
        );
        assert_eq!(stats.failed(ResourceKind::Variable), 1);
        assert_eq!(stats.finalize().status, RunStatus::Failed);
    }
}
