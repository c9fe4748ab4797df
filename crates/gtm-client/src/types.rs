//! Wire shapes of the Tag Manager API v2.

use gtm_model::{RemoteEntity, RemoteError, ResourceKind, Workspace};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Any account, container, workspace, variable, trigger or tag resource.
///
/// Only the fields the client reads are declared.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiResource {
    pub account_id: Option<String>,
    pub container_id: Option<String>,
    pub public_id: Option<String>,
    pub workspace_id: Option<String>,
    pub variable_id: Option<String>,
    pub trigger_id: Option<String>,
    pub tag_id: Option<String>,
    pub name: Option<String>,
    pub path: Option<String>,
}

impl ApiResource {
    fn entity_id(&self, kind: ResourceKind) -> Option<&String> {
        match kind {
            ResourceKind::Variable => self.variable_id.as_ref(),
            ResourceKind::Trigger => self.trigger_id.as_ref(),
            ResourceKind::Tag => self.tag_id.as_ref(),
        }
    }

    pub fn into_entity(self, kind: ResourceKind) -> Result<RemoteEntity, RemoteError> {
        let id = self
            .entity_id(kind)
            .cloned()
            .ok_or_else(|| missing(kind.as_str(), "id"))?;
        Ok(RemoteEntity {
            path: self.path.ok_or_else(|| missing(kind.as_str(), "path"))?,
            name: self.name.unwrap_or_default(),
            id,
        })
    }

    pub fn into_workspace(self) -> Result<Workspace, RemoteError> {
        Ok(Workspace {
            id: self
                .workspace_id
                .ok_or_else(|| missing("workspace", "workspaceId"))?,
            path: self.path.ok_or_else(|| missing("workspace", "path"))?,
            name: self.name.unwrap_or_default(),
        })
    }
}

fn missing(resource: &str, field: &str) -> RemoteError {
    RemoteError::Decode(format!("{resource} response has no {field}"))
}

/// One page of a list call; items live under a per-collection key.
#[derive(Debug, Default)]
pub struct Page {
    pub items: Vec<ApiResource>,
    pub next_page_token: Option<String>,
}

impl Page {
    pub fn from_value(mut value: Value, key: &str) -> Result<Self, RemoteError> {
        let next_page_token = value
            .get("nextPageToken")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string);
        let items = match value.get_mut(key).map(Value::take) {
            Some(items) => serde_json::from_value(items)
                .map_err(|err| RemoteError::Decode(format!("invalid '{key}' list: {err}")))?,
            None => Vec::new(),
        };
        Ok(Self {
            items,
            next_page_token,
        })
    }
}

/// Body of `workspaces.create`.
#[derive(Debug, Serialize)]
pub struct NewWorkspace<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

/// Google API error envelope.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Decodes an error response into [`RemoteError::Api`].
pub fn api_error(status: u16, body: &str) -> RemoteError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        Ok(envelope) => envelope
            .error
            .status
            .unwrap_or_else(|| "unknown error".to_string()),
        Err(_) if body.trim().is_empty() => "empty response".to_string(),
        Err(_) => body.trim().to_string(),
    };
    RemoteError::Api { status, message }
}
