use gtm_model::{
    ContainerRef, RemoteEntity, RemoteError, ResolvedTag, ResourceKind, TagManager, TriggerSpec,
    VariableSpec, Workspace, workspace_url,
};
use tracing::{info, warn};

use crate::api::Api;
use crate::types::{ApiResource, NewWorkspace};

/// [`TagManager`] bound to one container of the live API.
#[derive(Debug)]
pub struct GtmClient {
    api: Api,
    container: ContainerRef,
}

impl GtmClient {
    pub(crate) fn new(api: Api, container: ContainerRef) -> Self {
        Self { api, container }
    }

    pub fn container(&self) -> &ContainerRef {
        &self.container
    }

    fn list_workspaces(&mut self) -> Result<Vec<Workspace>, RemoteError> {
        let path = format!("{}/workspaces", self.container.path());
        self.api
            .list_all(&path, "workspace")?
            .into_iter()
            .map(ApiResource::into_workspace)
            .collect()
    }

    fn create_entity(
        &mut self,
        workspace: &Workspace,
        kind: ResourceKind,
        body: &impl serde::Serialize,
    ) -> Result<RemoteEntity, RemoteError> {
        let path = format!("{}/{}", workspace.path, kind.plural());
        self.api.create(&path, body)?.into_entity(kind)
    }
}

impl TagManager for GtmClient {
    fn get_or_create_workspace(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<Workspace, RemoteError> {
        // An unreadable listing falls through to creation.
        match self.list_workspaces() {
            Ok(workspaces) => {
                if let Some(existing) = workspaces.into_iter().find(|ws| ws.name == name) {
                    info!(workspace = name, id = %existing.id, "using existing workspace");
                    return Ok(existing);
                }
            }
            Err(err) => warn!(error = %err, "failed to list workspaces"),
        }

        info!(workspace = name, "workspace not found, creating");
        let path = format!("{}/workspaces", self.container.path());
        self.api
            .create(&path, &NewWorkspace { name, description })?
            .into_workspace()
    }

    fn list(
        &mut self,
        workspace: &Workspace,
        kind: ResourceKind,
    ) -> Result<Vec<RemoteEntity>, RemoteError> {
        let path = format!("{}/{}", workspace.path, kind.plural());
        self.api
            .list_all(&path, kind.as_str())?
            .into_iter()
            .map(|resource| resource.into_entity(kind))
            .collect()
    }

    fn delete(&mut self, _kind: ResourceKind, entity: &RemoteEntity) -> Result<(), RemoteError> {
        self.api.delete(&entity.path)
    }

    fn create_variable(
        &mut self,
        workspace: &Workspace,
        variable: &VariableSpec,
    ) -> Result<RemoteEntity, RemoteError> {
        self.create_entity(workspace, ResourceKind::Variable, variable)
    }

    fn create_trigger(
        &mut self,
        workspace: &Workspace,
        trigger: &TriggerSpec,
    ) -> Result<RemoteEntity, RemoteError> {
        self.create_entity(workspace, ResourceKind::Trigger, trigger)
    }

    fn create_tag(
        &mut self,
        workspace: &Workspace,
        tag: &ResolvedTag,
    ) -> Result<RemoteEntity, RemoteError> {
        self.create_entity(workspace, ResourceKind::Tag, tag)
    }

    fn workspace_url(&self, workspace: &Workspace) -> String {
        workspace_url(&self.container, &workspace.id)
    }
}
