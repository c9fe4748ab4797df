//! Shared model for the tag-container deployment pipeline.

pub mod document;
pub mod error_code;
pub mod remote;
pub mod run;
pub mod stats;

pub use document::{
    CUSTOM_EVENT_TRIGGER, CanonicalDocument, DEFAULT_VARIABLE_TYPE, EVENT_NAME_TOKEN, HTML_TAG,
    PAGEVIEW_TRIGGER, Parameter, ResourceCounts, ResourceKind, TEMPLATE_PARAMETER, TagSpec,
    TriggerRole, TriggerSpec, VariableSpec,
};
pub use error_code::ErrorCode;
pub use remote::{
    Connector, ContainerRef, RemoteEntity, RemoteError, ResolvedTag, TagManager, Workspace,
    workspace_url,
};
pub use run::{InvalidTransition, RunState};
pub use stats::{CreationStats, RunStatus};
