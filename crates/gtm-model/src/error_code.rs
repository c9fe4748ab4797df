//! Machine-readable failure codes for the upload boundary.
//!
//! Codes are derived from error text, so the messages produced by the
//! pipeline must keep containing the marker substrings below.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingContainerId,
    ContainerNotFound,
    AuthFailed,
    UnknownTemplate,
    UnknownError,
}

const MARKERS: &[(&str, ErrorCode)] = &[
    ("No GTM container ID provided", ErrorCode::MissingContainerId),
    (
        "Could not find GTM container matching identifier",
        ErrorCode::ContainerNotFound,
    ),
    ("Authentication failed", ErrorCode::AuthFailed),
    (
        "vendorTemplate.key: Unknown entity type",
        ErrorCode::UnknownTemplate,
    ),
];

impl ErrorCode {
    /// Classifies failure output by the first matching marker.
    pub fn classify(text: &str) -> Self {
        MARKERS
            .iter()
            .find(|(marker, _)| text.contains(marker))
            .map_or(Self::UnknownError, |(_, code)| *code)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingContainerId => "MISSING_CONTAINER_ID",
            Self::ContainerNotFound => "CONTAINER_NOT_FOUND",
            Self::AuthFailed => "AUTH_FAILED",
            Self::UnknownTemplate => "UNKNOWN_TEMPLATE",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Short message suitable for an end user.
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::MissingContainerId => {
                "Container ID is missing. Please enter a valid container ID."
            }
            Self::ContainerNotFound => {
                "Cannot find this container. Check the container ID and service account access."
            }
            Self::AuthFailed => {
                "Authentication failed. Check service account credentials and permissions."
            }
            Self::UnknownTemplate => {
                "Some tags use a custom template that is not installed in this container."
            }
            Self::UnknownError => "Processing failed. Please check logs.",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
