//! Canonical document shared by the normalizer, validator and orchestrator.
//!
//! Every input encoding is converted into [`CanonicalDocument`]. Trigger
//! references on tags are trigger *names* at this stage; remote identifiers
//! only appear once the orchestrator has created the triggers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameter type written for every normalized parameter.
pub const TEMPLATE_PARAMETER: &str = "template";

/// Default variable type for spreadsheet rows (user-defined constant).
pub const DEFAULT_VARIABLE_TYPE: &str = "v";

/// Default trigger type for spreadsheet rows.
pub const PAGEVIEW_TRIGGER: &str = "PAGEVIEW";

/// Trigger type that carries a custom event filter.
pub const CUSTOM_EVENT_TRIGGER: &str = "CUSTOM_EVENT";

/// Default tag type for spreadsheet rows (custom HTML).
pub const HTML_TAG: &str = "html";

/// Built-in variable holding the current data layer event name.
pub const EVENT_NAME_TOKEN: &str = "{{_event}}";

/// A `{key, type, value}` parameter triple.
///
/// All three fields are optional in the model so the validator can report a
/// missing one with its field path instead of the deserializer rejecting the
/// whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Parameter {
    /// Builds a `template` parameter.
    pub fn template(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            kind: Some(TEMPLATE_PARAMETER.to_string()),
            value: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub parameter: Vec<Parameter>,
}

/// Trigger definition. Filter fields are opaque and forwarded verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerSpec {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_event_filter: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_event_filter: Option<Value>,
}

impl TriggerSpec {
    /// Iterates the filter fields that are present, with their wire names.
    pub fn filters(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        [
            ("filter", self.filter.as_ref()),
            ("customEventFilter", self.custom_event_filter.as_ref()),
            ("autoEventFilter", self.auto_event_filter.as_ref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
    }
}

/// Tag definition; `firing_trigger_id` and `blocking_trigger_id` hold names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSpec {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub parameter: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firing_trigger_id: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocking_trigger_id: Option<Vec<String>>,
}

impl TagSpec {
    /// Iterates every trigger reference with its role.
    pub fn trigger_references(&self) -> impl Iterator<Item = (TriggerRole, &str)> {
        let firing = self
            .firing_trigger_id
            .iter()
            .flatten()
            .map(|name| (TriggerRole::Firing, name.as_str()));
        let blocking = self
            .blocking_trigger_id
            .iter()
            .flatten()
            .map(|name| (TriggerRole::Blocking, name.as_str()));
        firing.chain(blocking)
    }
}

/// How a tag refers to a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerRole {
    Firing,
    Blocking,
}

impl TriggerRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Firing => "firing",
            Self::Blocking => "blocking",
        }
    }
}

impl std::fmt::Display for TriggerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root value passed between every pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDocument {
    #[serde(default)]
    pub variables: Vec<VariableSpec>,
    #[serde(default)]
    pub triggers: Vec<TriggerSpec>,
    #[serde(default)]
    pub tags: Vec<TagSpec>,
}

impl CanonicalDocument {
    /// Per-kind entry counts.
    pub fn counts(&self) -> ResourceCounts {
        ResourceCounts {
            variables: self.variables.len(),
            triggers: self.triggers.len(),
            tags: self.tags.len(),
        }
    }

    /// Keeps only the entries whose `type` equals `template_type`.
    pub fn retain_type(&mut self, template_type: &str) {
        self.variables.retain(|variable| variable.kind == template_type);
        self.triggers.retain(|trigger| trigger.kind == template_type);
        self.tags.retain(|tag| tag.kind == template_type);
    }

    pub fn is_empty(&self) -> bool {
        self.counts().total() == 0
    }
}

/// Variable/trigger/tag counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCounts {
    pub variables: usize,
    pub triggers: usize,
    pub tags: usize,
}

impl ResourceCounts {
    pub const fn new(variables: usize, triggers: usize, tags: usize) -> Self {
        Self {
            variables,
            triggers,
            tags,
        }
    }

    pub const fn total(&self) -> usize {
        self.variables + self.triggers + self.tags
    }

    pub const fn get(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Variable => self.variables,
            ResourceKind::Trigger => self.triggers,
            ResourceKind::Tag => self.tags,
        }
    }

    pub fn increment(&mut self, kind: ResourceKind) {
        match kind {
            ResourceKind::Variable => self.variables += 1,
            ResourceKind::Trigger => self.triggers += 1,
            ResourceKind::Tag => self.tags += 1,
        }
    }
}

/// The three resource kinds, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Variable,
    Trigger,
    Tag,
}

impl ResourceKind {
    /// Creation order. Clearing walks it in reverse.
    pub const CREATION_ORDER: [ResourceKind; 3] = [Self::Variable, Self::Trigger, Self::Tag];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Variable => "variable",
            Self::Trigger => "trigger",
            Self::Tag => "tag",
        }
    }

    /// Plural form used in logs and API collection paths.
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Variable => "variables",
            Self::Trigger => "triggers",
            Self::Tag => "tags",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_parameter_shape() {
        let parameter = Parameter::template("html", "<script></script>");
        let value = serde_json::to_value(&parameter).unwrap();
        assert_eq!(
            value,
            json!({"key": "html", "type": "template", "value": "<script></script>"})
        );
    }

    #[test]
    fn test_trigger_references_keep_order_and_duplicates() {
        let tag = TagSpec {
            name: "Pixel".to_string(),
            kind: HTML_TAG.to_string(),
            firing_trigger_id: Some(vec!["A".to_string(), "A".to_string()]),
            blocking_trigger_id: Some(vec!["B".to_string()]),
            ..TagSpec::default()
        };
        let refs: Vec<_> = tag.trigger_references().collect();
        assert_eq!(
            refs,
            vec![
                (TriggerRole::Firing, "A"),
                (TriggerRole::Firing, "A"),
                (TriggerRole::Blocking, "B"),
            ]
        );
    }

    #[test]
    fn test_retain_type_filters_every_kind() {
        let mut doc = CanonicalDocument {
            variables: vec![VariableSpec {
                name: "Const".to_string(),
                kind: "v".to_string(),
                parameter: vec![],
            }],
            triggers: vec![TriggerSpec {
                name: "All Pages".to_string(),
                kind: PAGEVIEW_TRIGGER.to_string(),
                ..TriggerSpec::default()
            }],
            tags: vec![
                TagSpec {
                    name: "Html".to_string(),
                    kind: HTML_TAG.to_string(),
                    ..TagSpec::default()
                },
                TagSpec {
                    name: "Img".to_string(),
                    kind: "img".to_string(),
                    ..TagSpec::default()
                },
            ],
        };
        doc.retain_type(HTML_TAG);
        assert_eq!(doc.counts(), ResourceCounts::new(0, 0, 1));
        assert_eq!(doc.tags[0].name, "Html");
    }

    #[test]
    fn test_missing_sequences_default_to_empty() {
        let doc: CanonicalDocument = serde_json::from_value(json!({"tags": []})).unwrap();
        assert!(doc.variables.is_empty());
        assert!(doc.triggers.is_empty());
        assert!(doc.is_empty());
    }
}
