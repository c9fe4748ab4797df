//! Name to remote-ID table for triggers created during a run.

use std::collections::HashMap;

use gtm_model::{ResolvedTag, TagSpec, TriggerRole};

/// Trigger IDs keyed by trigger name.
///
/// Filled while triggers are created and read while tags are created. A
/// trigger that failed to create is simply absent.
#[derive(Debug, Clone, Default)]
pub struct TriggerIdMap {
    ids: HashMap<String, String>,
}

impl TriggerIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, id: impl Into<String>) {
        self.ids.insert(name.into(), id.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.ids.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Rewrites a tag's trigger names to remote IDs.
    ///
    /// Names missing from the map are dropped with a warning; they are never
    /// sent as raw names.
    pub fn resolve(&self, tag: &TagSpec) -> ResolvedTag {
        ResolvedTag {
            name: tag.name.clone(),
            kind: tag.kind.clone(),
            parameter: tag.parameter.clone(),
            firing_trigger_id: tag
                .firing_trigger_id
                .as_deref()
                .map(|names| self.resolve_names(&tag.name, TriggerRole::Firing, names)),
            blocking_trigger_id: tag
                .blocking_trigger_id
                .as_deref()
                .map(|names| self.resolve_names(&tag.name, TriggerRole::Blocking, names)),
        }
    }

    fn resolve_names(&self, tag: &str, role: TriggerRole, names: &[String]) -> Vec<String> {
        names
            .iter()
            .filter_map(|name| {
                let id = self.get(name);
                if id.is_none() {
                    tracing::warn!(
                        tag,
                        %role,
                        trigger = %name,
                        "trigger not found in trigger map, reference dropped"
                    );
                }
                id.map(str::to_string)
            })
            .collect()
    }
}
