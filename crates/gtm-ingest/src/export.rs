//! Conversion of a container export (`containerVersion`) into canonical form.
//!
//! Remote trigger IDs on tags are rewritten to trigger names using the
//! export's own trigger list. An ID with no matching trigger is kept as the
//! ID string; the validator will then report it as a dangling name.

use std::collections::HashMap;

use gtm_model::{
    CanonicalDocument, Parameter, TEMPLATE_PARAMETER, TagSpec, TriggerSpec, VariableSpec,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{IngestError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContainerVersion {
    tag: Vec<ExportTag>,
    trigger: Vec<ExportTrigger>,
    variable: Vec<ExportVariable>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExportParameter {
    key: Option<String>,
    value: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExportVariable {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    parameter: Vec<ExportParameter>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ExportTrigger {
    trigger_id: Option<Value>,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    filter: Option<Value>,
    custom_event_filter: Option<Value>,
    auto_event_filter: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ExportTag {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    parameter: Vec<ExportParameter>,
    firing_trigger_id: Option<Vec<Value>>,
    blocking_trigger_id: Option<Vec<Value>>,
}

/// Converts the value of a `containerVersion` key.
pub(crate) fn convert_export(container_version: &Value) -> Result<CanonicalDocument> {
    let version = ContainerVersion::deserialize(container_version).map_err(|err| {
        IngestError::Export {
            reason: err.to_string(),
        }
    })?;

    let trigger_names: HashMap<String, String> = version
        .trigger
        .iter()
        .filter_map(|trigger| {
            let id = trigger.trigger_id.as_ref().and_then(id_string)?;
            let name = trigger.name.clone()?;
            Some((id, name))
        })
        .collect();

    let tags = version
        .tag
        .into_iter()
        .map(|tag| TagSpec {
            name: tag.name.unwrap_or_default(),
            kind: tag.kind.unwrap_or_default(),
            parameter: convert_parameters(tag.parameter),
            firing_trigger_id: tag
                .firing_trigger_id
                .map(|ids| ids_to_names(&ids, &trigger_names)),
            blocking_trigger_id: tag
                .blocking_trigger_id
                .map(|ids| ids_to_names(&ids, &trigger_names)),
        })
        .collect();

    let triggers = version
        .trigger
        .into_iter()
        .map(|trigger| TriggerSpec {
            name: trigger.name.unwrap_or_default(),
            kind: trigger.kind.unwrap_or_default(),
            filter: trigger.filter,
            custom_event_filter: trigger.custom_event_filter,
            auto_event_filter: trigger.auto_event_filter,
        })
        .collect();

    let variables = version
        .variable
        .into_iter()
        .map(|variable| VariableSpec {
            name: variable.name.unwrap_or_default(),
            kind: variable.kind.unwrap_or_default(),
            parameter: convert_parameters(variable.parameter),
        })
        .collect();

    Ok(CanonicalDocument {
        variables,
        triggers,
        tags,
    })
}

/// Rewrites export parameters to `{key, type: "template", value}`.
fn convert_parameters(parameters: Vec<ExportParameter>) -> Vec<Parameter> {
    parameters
        .into_iter()
        .map(|parameter| Parameter {
            key: parameter.key,
            kind: Some(TEMPLATE_PARAMETER.to_string()),
            value: Some(
                parameter
                    .value
                    .as_ref()
                    .and_then(scalar_string)
                    .unwrap_or_default(),
            ),
        })
        .collect()
}

/// Unmatched IDs pass through as text, whatever their JSON type.
fn ids_to_names(ids: &[Value], trigger_names: &HashMap<String, String>) -> Vec<String> {
    ids.iter()
        .map(|value| {
            id_string(value).unwrap_or_else(|| {
                tracing::warn!(
                    trigger_id = %value,
                    "export trigger id is not a string or number"
                );
                value.to_string()
            })
        })
        .map(|id| match trigger_names.get(&id) {
            Some(name) => name.clone(),
            None => {
                tracing::debug!(trigger_id = %id, "export trigger id has no matching trigger");
                id
            }
        })
        .collect()
}

/// Export IDs are usually strings but some tools write them as numbers.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
