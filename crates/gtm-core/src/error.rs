//! Orchestration and pipeline errors.

use gtm_ingest::IngestError;
use gtm_model::{CreationStats, InvalidTransition, RemoteError};
use gtm_validate::ValidationError;
use thiserror::Error;

/// Failures that stop orchestration. Per-resource errors never end up here.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The workspace could not be found or created.
    #[error("Failed to prepare workspace '{name}': {source}")]
    Workspace {
        name: String,
        #[source]
        source: RemoteError,
    },

    /// Cancellation was observed; `stats` holds what was recorded so far.
    #[error("Process interrupted by user")]
    Interrupted { stats: CreationStats },
}

/// Run-level failure. Ends the run as `ABORTED` or `INTERRUPTED`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(
        "No GTM container ID provided. Pass --container-id (numeric ID or GTM-XXXX public ID) \
         or set GTM_CONTAINER_ID."
    )]
    MissingContainerId,

    /// Container lookup failed.
    #[error(transparent)]
    Resolve(RemoteError),

    /// Authentication against the remote service failed.
    #[error("{}", connect_message(.0))]
    Connect(RemoteError),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error("Process interrupted by user")]
    Interrupted,

    #[error(transparent)]
    State(#[from] InvalidTransition),
}

impl PipelineError {
    pub fn is_interrupt(&self) -> bool {
        matches!(
            self,
            Self::Interrupted | Self::Deploy(DeployError::Interrupted { .. })
        )
    }
}

fn connect_message(err: &RemoteError) -> String {
    match err {
        RemoteError::Authentication(_) => err.to_string(),
        other => format!("Authentication failed: {other}"),
    }
}
