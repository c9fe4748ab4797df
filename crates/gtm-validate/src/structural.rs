//! Structural pass: required fields, parameter triples, filter shapes and
//! name uniqueness. Stops at the first violation.

use std::collections::HashSet;

use gtm_model::{CanonicalDocument, Parameter, ResourceKind};
use serde_json::Value;

use crate::error::{Result, ValidationError};

pub fn check_structure(doc: &CanonicalDocument) -> Result<()> {
    for (index, variable) in doc.variables.iter().enumerate() {
        let path = format!("variables[{index}]");
        check_identity(&path, &variable.name, &variable.kind)?;
        check_parameters(&path, &variable.parameter)?;
    }
    for (index, trigger) in doc.triggers.iter().enumerate() {
        let path = format!("triggers[{index}]");
        check_identity(&path, &trigger.name, &trigger.kind)?;
        for (field, filter) in trigger.filters() {
            if !filter.is_array() {
                return Err(ValidationError::structural(
                    format!("{path}.{field}"),
                    format!("expected an array, found {}", json_kind(filter)),
                ));
            }
        }
    }
    for (index, tag) in doc.tags.iter().enumerate() {
        let path = format!("tags[{index}]");
        check_identity(&path, &tag.name, &tag.kind)?;
        check_parameters(&path, &tag.parameter)?;
    }

    check_unique(
        ResourceKind::Variable,
        doc.variables.iter().map(|variable| variable.name.as_str()),
    )?;
    check_unique(
        ResourceKind::Trigger,
        doc.triggers.iter().map(|trigger| trigger.name.as_str()),
    )?;
    check_unique(ResourceKind::Tag, doc.tags.iter().map(|tag| tag.name.as_str()))
}

fn check_identity(path: &str, name: &str, kind: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::structural(
            format!("{path}.name"),
            "'name' is a required non-empty string",
        ));
    }
    if kind.trim().is_empty() {
        return Err(ValidationError::structural(
            format!("{path}.type"),
            "'type' is a required non-empty string",
        ));
    }
    Ok(())
}

fn check_parameters(path: &str, parameters: &[Parameter]) -> Result<()> {
    for (index, parameter) in parameters.iter().enumerate() {
        let fields = [
            ("key", parameter.key.is_some()),
            ("type", parameter.kind.is_some()),
            ("value", parameter.value.is_some()),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, present)| !present) {
            return Err(ValidationError::structural(
                format!("{path}.parameter[{index}].{field}"),
                format!("'{field}' is a required property"),
            ));
        }
    }
    Ok(())
}

fn check_unique<'a>(kind: ResourceKind, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for (index, name) in names.enumerate() {
        if !seen.insert(name) {
            return Err(ValidationError::structural(
                format!("{}[{index}].name", kind.plural()),
                format!("duplicate {kind} name '{name}'"),
            ));
        }
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtm_model::{TagSpec, TriggerSpec, VariableSpec};
    use serde_json::json;

    fn variable(name: &str) -> VariableSpec {
        VariableSpec {
            name: name.to_string(),
            kind: "v".to_string(),
            parameter: vec![],
        }
    }

    fn path_of(result: Result<()>) -> String {
        match result {
            Err(ValidationError::Structural { path, .. }) => path,
            other => panic!("expected structural error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_name_reports_path() {
        let doc = CanonicalDocument {
            variables: vec![variable("ok"), variable("")],
            ..CanonicalDocument::default()
        };
        assert_eq!(path_of(check_structure(&doc)), "variables[1].name");
    }

    #[test]
    fn test_missing_parameter_value_reports_path() {
        let doc = CanonicalDocument {
            tags: vec![TagSpec {
                name: "Pixel".to_string(),
                kind: "html".to_string(),
                parameter: vec![
                    gtm_model::Parameter::template("html", "<img>"),
                    gtm_model::Parameter {
                        key: Some("extra".to_string()),
                        kind: Some("template".to_string()),
                        value: None,
                    },
                ],
                ..TagSpec::default()
            }],
            ..CanonicalDocument::default()
        };
        assert_eq!(
            path_of(check_structure(&doc)),
            "tags[0].parameter[1].value"
        );
    }

    #[test]
    fn test_filter_must_be_array() {
        let doc = CanonicalDocument {
            triggers: vec![TriggerSpec {
                name: "Clicks".to_string(),
                kind: "CLICK".to_string(),
                auto_event_filter: Some(json!({"type": "equals"})),
                ..TriggerSpec::default()
            }],
            ..CanonicalDocument::default()
        };
        let err = check_structure(&doc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Input data validation failed at triggers[0].autoEventFilter: expected an array, found object"
        );
    }

    #[test]
    fn test_duplicate_names_reported_at_second_occurrence() {
        let doc = CanonicalDocument {
            variables: vec![variable("a"), variable("b"), variable("a")],
            ..CanonicalDocument::default()
        };
        assert_eq!(path_of(check_structure(&doc)), "variables[2].name");
    }

    #[test]
    fn test_same_name_across_kinds_is_allowed() {
        let doc = CanonicalDocument {
            variables: vec![variable("Shared")],
            triggers: vec![TriggerSpec {
                name: "Shared".to_string(),
                kind: "PAGEVIEW".to_string(),
                ..TriggerSpec::default()
            }],
            ..CanonicalDocument::default()
        };
        assert!(check_structure(&doc).is_ok());
    }
}
