//! In-memory tag manager used by the orchestration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use gtm_core::CancelToken;
use gtm_model::{
    CanonicalDocument, Connector, ContainerRef, Parameter, RemoteEntity, RemoteError,
    ResolvedTag, ResourceKind, TagManager, TagSpec, TriggerSpec, VariableSpec, Workspace,
    workspace_url,
};

#[derive(Debug, Default)]
pub struct FakeTagManager {
    pub container: Option<ContainerRef>,
    pub existing: Vec<(ResourceKind, RemoteEntity)>,
    /// Names whose creation is rejected.
    pub reject: HashSet<String>,
    /// Message used for rejected creations.
    pub reject_message: Option<String>,
    pub fail_delete: HashSet<String>,
    pub fail_list: HashSet<ResourceKind>,
    pub workspace_error: Option<RemoteError>,
    /// Cancels this token once `n` resources have been created.
    pub cancel_after: Option<(usize, CancelToken)>,
    pub calls: Vec<String>,
    pub sent_tags: Vec<ResolvedTag>,
    pub created: usize,
    pub next_id: u32,
}

impl FakeTagManager {
    pub fn rejecting(names: &[&str]) -> Self {
        Self {
            reject: names.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn with_existing(mut self, kind: ResourceKind, name: &str) -> Self {
        let id = format!("old-{}", self.existing.len());
        self.existing.push((
            kind,
            RemoteEntity {
                path: format!("workspaces/1/{}/{id}", kind.plural()),
                id,
                name: name.to_string(),
            },
        ));
        self
    }

    pub fn mutations(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| call.starts_with("create") || call.starts_with("delete"))
            .count()
    }

    fn create(&mut self, kind: ResourceKind, name: &str) -> Result<RemoteEntity, RemoteError> {
        self.calls.push(format!("create_{kind}:{name}"));
        if self.reject.contains(name) {
            return Err(RemoteError::Api {
                status: 400,
                message: self
                    .reject_message
                    .clone()
                    .unwrap_or_else(|| "Invalid argument".to_string()),
            });
        }
        self.next_id += 1;
        self.created += 1;
        if let Some((threshold, token)) = &self.cancel_after
            && self.created >= *threshold
        {
            token.cancel();
        }
        let id = self.next_id.to_string();
        Ok(RemoteEntity {
            path: format!("workspaces/1/{}/{id}", kind.plural()),
            id,
            name: name.to_string(),
        })
    }
}

impl TagManager for FakeTagManager {
    fn get_or_create_workspace(
        &mut self,
        name: &str,
        _description: &str,
    ) -> Result<Workspace, RemoteError> {
        self.calls.push(format!("workspace:{name}"));
        if let Some(err) = self.workspace_error.clone() {
            return Err(err);
        }
        Ok(Workspace {
            id: "1".to_string(),
            name: name.to_string(),
            path: "accounts/6001/containers/42/workspaces/1".to_string(),
        })
    }

    fn list(
        &mut self,
        _workspace: &Workspace,
        kind: ResourceKind,
    ) -> Result<Vec<RemoteEntity>, RemoteError> {
        self.calls.push(format!("list_{kind}"));
        if self.fail_list.contains(&kind) {
            return Err(RemoteError::Api {
                status: 500,
                message: "backend error".to_string(),
            });
        }
        Ok(self
            .existing
            .iter()
            .filter(|(existing, _)| *existing == kind)
            .map(|(_, entity)| entity.clone())
            .collect())
    }

    fn delete(&mut self, kind: ResourceKind, entity: &RemoteEntity) -> Result<(), RemoteError> {
        self.calls.push(format!("delete_{kind}:{}", entity.name));
        if self.fail_delete.contains(&entity.name) {
            return Err(RemoteError::Api {
                status: 403,
                message: "locked".to_string(),
            });
        }
        self.existing.retain(|(_, existing)| existing.id != entity.id);
        Ok(())
    }

    fn create_variable(
        &mut self,
        _workspace: &Workspace,
        variable: &VariableSpec,
    ) -> Result<RemoteEntity, RemoteError> {
        self.create(ResourceKind::Variable, &variable.name)
    }

    fn create_trigger(
        &mut self,
        _workspace: &Workspace,
        trigger: &TriggerSpec,
    ) -> Result<RemoteEntity, RemoteError> {
        self.create(ResourceKind::Trigger, &trigger.name)
    }

    fn create_tag(
        &mut self,
        _workspace: &Workspace,
        tag: &ResolvedTag,
    ) -> Result<RemoteEntity, RemoteError> {
        self.sent_tags.push(tag.clone());
        self.create(ResourceKind::Tag, &tag.name)
    }

    fn workspace_url(&self, workspace: &Workspace) -> String {
        let container = self
            .container
            .clone()
            .unwrap_or_else(|| ContainerRef::new("6001", "42"));
        workspace_url(&container, &workspace.id)
    }
}

/// Shares one fake between the connector and the test body.
#[derive(Debug, Clone, Default)]
pub struct SharedTagManager(pub Rc<RefCell<FakeTagManager>>);

impl TagManager for SharedTagManager {
    fn get_or_create_workspace(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<Workspace, RemoteError> {
        self.0.borrow_mut().get_or_create_workspace(name, description)
    }

    fn list(
        &mut self,
        workspace: &Workspace,
        kind: ResourceKind,
    ) -> Result<Vec<RemoteEntity>, RemoteError> {
        self.0.borrow_mut().list(workspace, kind)
    }

    fn delete(&mut self, kind: ResourceKind, entity: &RemoteEntity) -> Result<(), RemoteError> {
        self.0.borrow_mut().delete(kind, entity)
    }

    fn create_variable(
        &mut self,
        workspace: &Workspace,
        variable: &VariableSpec,
    ) -> Result<RemoteEntity, RemoteError> {
        self.0.borrow_mut().create_variable(workspace, variable)
    }

    fn create_trigger(
        &mut self,
        workspace: &Workspace,
        trigger: &TriggerSpec,
    ) -> Result<RemoteEntity, RemoteError> {
        self.0.borrow_mut().create_trigger(workspace, trigger)
    }

    fn create_tag(
        &mut self,
        workspace: &Workspace,
        tag: &ResolvedTag,
    ) -> Result<RemoteEntity, RemoteError> {
        self.0.borrow_mut().create_tag(workspace, tag)
    }

    fn workspace_url(&self, workspace: &Workspace) -> String {
        self.0.borrow().workspace_url(workspace)
    }
}

/// Connector over a shared fake, recording lookups and connections.
#[derive(Debug, Default)]
pub struct FakeConnector {
    pub service: SharedTagManager,
    pub containers: Vec<(String, ContainerRef)>,
    pub connect_error: Option<RemoteError>,
    pub resolved: RefCell<Vec<String>>,
    pub connected: RefCell<Option<ContainerRef>>,
}

impl FakeConnector {
    pub fn with_container(mut self, identifier: &str, container: ContainerRef) -> Self {
        self.containers.push((identifier.to_string(), container));
        self
    }

    pub fn fake(&self) -> std::cell::Ref<'_, FakeTagManager> {
        self.service.0.borrow()
    }
}

impl Connector for FakeConnector {
    type Service = SharedTagManager;

    fn resolve_container(&self, identifier: &str) -> Result<ContainerRef, RemoteError> {
        self.resolved.borrow_mut().push(identifier.to_string());
        self.containers
            .iter()
            .find(|(id, _)| id == identifier)
            .map(|(_, container)| container.clone())
            .ok_or_else(|| RemoteError::ContainerNotFound {
                identifier: identifier.to_string(),
            })
    }

    fn connect(&self, container: &ContainerRef) -> Result<SharedTagManager, RemoteError> {
        if let Some(err) = self.connect_error.clone() {
            return Err(err);
        }
        *self.connected.borrow_mut() = Some(container.clone());
        self.service.0.borrow_mut().container = Some(container.clone());
        Ok(self.service.clone())
    }
}

pub fn variable(name: &str) -> VariableSpec {
    VariableSpec {
        name: name.to_string(),
        kind: "v".to_string(),
        parameter: vec![Parameter::template("value", name)],
    }
}

pub fn trigger(name: &str) -> TriggerSpec {
    TriggerSpec {
        name: name.to_string(),
        kind: "PAGEVIEW".to_string(),
        ..TriggerSpec::default()
    }
}

pub fn tag(name: &str, firing: &[&str]) -> TagSpec {
    TagSpec {
        name: name.to_string(),
        kind: "html".to_string(),
        parameter: vec![Parameter::template("html", "<img>")],
        firing_trigger_id: Some(firing.iter().map(ToString::to_string).collect()),
        blocking_trigger_id: None,
    }
}

/// Two variables, two triggers, three tags.
pub fn sample_document() -> CanonicalDocument {
    CanonicalDocument {
        variables: vec![variable("Site"), variable("Region")],
        triggers: vec![trigger("A"), trigger("B")],
        tags: vec![
            tag("Pixel", &["A", "B"]),
            tag("Banner", &["B"]),
            tag("Survey", &["A"]),
        ],
    }
}
