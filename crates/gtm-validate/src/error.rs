//! Validation failures.

use std::fmt;

use gtm_model::TriggerRole;
use serde::Serialize;
use thiserror::Error;

/// Why a document was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// First structural violation found, with its field path.
    #[error("Input data validation failed at {path}: {message}")]
    Structural { path: String, message: String },

    /// Every dangling trigger reference in the document.
    #[error("{}", render_dangling(.0))]
    DanglingReferences(Vec<DanglingReference>),
}

impl ValidationError {
    pub(crate) fn structural(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structural {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A tag naming a trigger that is not in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub tag: String,
    pub role: TriggerRole,
    pub trigger: String,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tag '{}' references non-existent {} trigger '{}'",
            self.tag, self.role, self.trigger
        )
    }
}

fn render_dangling(references: &[DanglingReference]) -> String {
    let mut message = String::from("Invalid trigger references found:");
    for reference in references {
        message.push_str("\n  - ");
        message.push_str(&reference.to_string());
    }
    message
}

/// Result type for validation.
pub type Result<T> = std::result::Result<T, ValidationError>;
