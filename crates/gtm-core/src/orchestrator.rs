//! Dependency-ordered creation of variables, triggers and tags.
//!
//! Order is fixed: variables, then triggers (recording their remote IDs by
//! name), then tags (resolving trigger names through those IDs). A failed
//! resource is recorded in [`CreationStats`] and the run moves on; only a
//! workspace failure or an interrupt stops it.

use gtm_model::{
    CanonicalDocument, CreationStats, RemoteEntity, RemoteError, ResourceCounts, ResourceKind,
    TagManager, TagSpec, TriggerSpec, VariableSpec, Workspace,
};
use serde::Serialize;
use tracing::{error, info, info_span, warn};

use crate::cancel::CancelToken;
use crate::error::DeployError;
use crate::trigger_map::TriggerIdMap;

/// What clearing a workspace removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClearSummary {
    pub deleted: ResourceCounts,
    /// Failed list or delete calls. These are logged and skipped.
    pub failures: usize,
}

/// Gets (or creates) the named workspace and clears it.
pub fn prepare_workspace<S: TagManager>(
    service: &mut S,
    name: &str,
    description: &str,
    cancel: &CancelToken,
) -> Result<(Workspace, ClearSummary), DeployError> {
    let _span = info_span!("prepare_workspace", workspace = name).entered();
    if cancel.is_cancelled() {
        return Err(interrupted(CreationStats::default()));
    }

    let workspace = service
        .get_or_create_workspace(name, description)
        .map_err(|source| DeployError::Workspace {
            name: name.to_string(),
            source,
        })?;
    info!(workspace_id = %workspace.id, "using workspace");

    let cleared = clear_workspace(service, &workspace, cancel)?;
    Ok((workspace, cleared))
}

/// Deletes every tag, then trigger, then variable in the workspace.
///
/// A failed list or delete is logged at warn level and skipped.
pub fn clear_workspace<S: TagManager>(
    service: &mut S,
    workspace: &Workspace,
    cancel: &CancelToken,
) -> Result<ClearSummary, DeployError> {
    let mut summary = ClearSummary::default();
    for kind in ResourceKind::CREATION_ORDER.into_iter().rev() {
        let entities = match service.list(workspace, kind) {
            Ok(entities) => entities,
            Err(err) => {
                warn!(%kind, error = %err, "failed to list {} for clearing", kind.plural());
                summary.failures += 1;
                continue;
            }
        };
        info!(%kind, count = entities.len(), "clearing workspace");
        for entity in &entities {
            if cancel.is_cancelled() {
                return Err(interrupted(CreationStats::default()));
            }
            match service.delete(kind, entity) {
                Ok(()) => {
                    summary.deleted.increment(kind);
                    info!(%kind, name = %entity.name, remote_id = %entity.id, "deleted");
                }
                Err(err) => {
                    summary.failures += 1;
                    warn!(%kind, name = %entity.name, error = %err, "failed to delete");
                }
            }
        }
    }
    Ok(summary)
}

/// Creates every resource of `doc` in `workspace`.
///
/// Returns finalized stats. `Err` only for an interrupt, carrying the stats
/// recorded up to that point.
pub fn create_all<S: TagManager>(
    doc: &CanonicalDocument,
    service: &mut S,
    workspace: &Workspace,
    cancel: &CancelToken,
) -> Result<CreationStats, DeployError> {
    let stats = CreationStats::new(doc.counts());
    let mut trigger_ids = TriggerIdMap::new();

    let stats = create_each(stats, &doc.variables, cancel, |variable| {
        service.create_variable(workspace, variable)
    })?;

    let stats = create_each(stats, &doc.triggers, cancel, |trigger| {
        let entity = service.create_trigger(workspace, trigger)?;
        trigger_ids.insert(trigger.name.as_str(), entity.id.as_str());
        Ok(entity)
    })?;
    info!(resolved = trigger_ids.len(), "trigger id map built");

    let stats = create_each(stats, &doc.tags, cancel, |tag| {
        service.create_tag(workspace, &trigger_ids.resolve(tag))
    })?;

    let stats = stats.finalize();
    info!(
        status = %stats.status,
        created = stats.created.total(),
        requested = stats.requested.total(),
        errors = stats.errors.len(),
        "creation finished"
    );
    Ok(stats)
}

/// A resource definition the orchestrator can create.
trait Resource {
    const KIND: ResourceKind;
    fn name(&self) -> &str;
}

impl Resource for VariableSpec {
    const KIND: ResourceKind = ResourceKind::Variable;
    fn name(&self) -> &str {
        &self.name
    }
}

impl Resource for TriggerSpec {
    const KIND: ResourceKind = ResourceKind::Trigger;
    fn name(&self) -> &str {
        &self.name
    }
}

impl Resource for TagSpec {
    const KIND: ResourceKind = ResourceKind::Tag;
    fn name(&self) -> &str {
        &self.name
    }
}

/// Folds one kind's specs into the running stats.
fn create_each<T, F>(
    stats: CreationStats,
    specs: &[T],
    cancel: &CancelToken,
    mut create: F,
) -> Result<CreationStats, DeployError>
where
    T: Resource,
    F: FnMut(&T) -> Result<RemoteEntity, RemoteError>,
{
    let kind = T::KIND;
    let _span = info_span!("create", %kind, count = specs.len()).entered();
    specs.iter().try_fold(stats, |mut stats, spec| {
        if cancel.is_cancelled() {
            return Err(interrupted(stats));
        }
        match create(spec) {
            Ok(entity) => {
                stats.record_created(kind);
                info!(%kind, name = spec.name(), remote_id = %entity.id, "created");
            }
            Err(err) => {
                error!(%kind, name = spec.name(), error = %err, "failed to create");
                stats.record_failure(kind, spec.name(), &err);
            }
        }
        Ok(stats)
    })
}

fn interrupted(stats: CreationStats) -> DeployError {
    warn!("interrupt observed, stopping before next remote call");
    DeployError::Interrupted { stats }
}
