//! Remote tag-management capability consumed by the orchestrator.
//!
//! The traits here are the seam between the pipeline and any concrete API
//! client. Implementations are expected to be blocking; the pipeline is
//! strictly sequential.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::{Parameter, ResourceKind, TriggerSpec, VariableSpec};

/// Public URL of the Tag Manager web UI.
pub const TAG_MANAGER_UI_URL: &str = "https://tagmanager.google.com/#/container";

/// Errors reported by a remote tag-management service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(String),

    /// Credentials could not be loaded or exchanged for a token.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// No accessible container matches the identifier.
    #[error(
        "Could not find GTM container matching identifier '{identifier}'. \
         Ensure the service account has access to the correct GTM account/container."
    )]
    ContainerNotFound { identifier: String },

    /// A response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Whether a retry of the same call could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Account and container a run is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRef {
    pub account_id: String,
    pub container_id: String,
}

impl ContainerRef {
    pub fn new(account_id: impl Into<String>, container_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            container_id: container_id.into(),
        }
    }

    /// API resource path (`accounts/{a}/containers/{c}`).
    pub fn path(&self) -> String {
        format!(
            "accounts/{}/containers/{}",
            self.account_id, self.container_id
        )
    }
}

/// A remote workspace handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    /// Full API resource path of the workspace.
    pub path: String,
}

/// A variable, trigger or tag as it exists remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntity {
    pub id: String,
    pub name: String,
    pub path: String,
}

/// A tag whose trigger references have been resolved to remote IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTag {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub parameter: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firing_trigger_id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking_trigger_id: Option<Vec<String>>,
}

/// Web UI link for a workspace.
pub fn workspace_url(container: &ContainerRef, workspace_id: &str) -> String {
    format!(
        "{TAG_MANAGER_UI_URL}/accounts/{}/containers/{}/workspaces/{workspace_id}",
        container.account_id, container.container_id
    )
}

/// Container-scoped operations of the remote service.
pub trait TagManager {
    /// Returns the workspace called `name`, creating it when absent.
    fn get_or_create_workspace(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<Workspace, RemoteError>;

    fn list(
        &mut self,
        workspace: &Workspace,
        kind: ResourceKind,
    ) -> Result<Vec<RemoteEntity>, RemoteError>;

    fn delete(&mut self, kind: ResourceKind, entity: &RemoteEntity) -> Result<(), RemoteError>;

    fn create_variable(
        &mut self,
        workspace: &Workspace,
        variable: &VariableSpec,
    ) -> Result<RemoteEntity, RemoteError>;

    fn create_trigger(
        &mut self,
        workspace: &Workspace,
        trigger: &TriggerSpec,
    ) -> Result<RemoteEntity, RemoteError>;

    fn create_tag(
        &mut self,
        workspace: &Workspace,
        tag: &ResolvedTag,
    ) -> Result<RemoteEntity, RemoteError>;

    fn workspace_url(&self, workspace: &Workspace) -> String;
}

/// Resolves containers and opens authenticated [`TagManager`] sessions.
pub trait Connector {
    type Service: TagManager;

    /// Finds the account owning a container given its numeric or public ID.
    fn resolve_container(&self, identifier: &str) -> Result<ContainerRef, RemoteError>;

    /// Authenticates and binds a service to `container`.
    fn connect(&self, container: &ContainerRef) -> Result<Self::Service, RemoteError>;
}
