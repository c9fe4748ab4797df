//! Creation orchestration and the run pipeline.
//!
//! [`create_all`] turns a validated document into remote resources through a
//! [`gtm_model::TagManager`]; [`run`] wraps it with ingestion, validation,
//! container resolution and authentication and always yields a [`RunReport`].

mod cancel;
mod error;
mod orchestrator;
pub mod pipeline;
mod trigger_map;

pub use cancel::CancelToken;
pub use error::{DeployError, PipelineError};
pub use orchestrator::{ClearSummary, clear_workspace, create_all, prepare_workspace};
pub use pipeline::{
    DEFAULT_WORKSPACE_NAME, InputSource, RunReport, RunRequest, WorkspaceSummary, run,
};
pub use trigger_map::TriggerIdMap;
