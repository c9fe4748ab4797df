//! Row rules turning spreadsheet records into canonical specs.

use gtm_model::{
    CUSTOM_EVENT_TRIGGER, DEFAULT_VARIABLE_TYPE, EVENT_NAME_TOKEN, HTML_TAG, PAGEVIEW_TRIGGER,
    Parameter, TEMPLATE_PARAMETER, TagSpec, TriggerSpec, VariableSpec,
};
use serde_json::{Value, json};

use crate::sheet::{SheetRecord, SheetTable};

/// Column names recognised on the three sheets.
pub mod columns {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const VALUE: &str = "value";
    pub const PARAMETER_KEY: &str = "parameter_key";
    pub const PARAMETER_VALUE: &str = "parameter_value";
    pub const EVENT_NAME: &str = "event_name";
    pub const FILTER_TYPE: &str = "filter_type";
    pub const FILTER_PARAMETER: &str = "filter_parameter";
    pub const HTML: &str = "html";
    pub const FIRING_TRIGGERS: &str = "firing_triggers";
    pub const BLOCKING_TRIGGERS: &str = "blocking_triggers";
}

/// Separator for multi-valued cells.
pub const LIST_SEPARATOR: char = '|';

pub fn parse_variables(table: &SheetTable) -> Vec<VariableSpec> {
    table
        .records()
        .filter_map(|record| {
            let name = record.get(columns::NAME)?;
            let mut parameter = Vec::new();
            if let Some(value) = record.get(columns::VALUE) {
                parameter.push(Parameter::template(columns::VALUE, value));
            }
            parameter.extend(paired_parameters(&record));
            Some(VariableSpec {
                name: name.to_string(),
                kind: record
                    .get(columns::TYPE)
                    .unwrap_or(DEFAULT_VARIABLE_TYPE)
                    .to_string(),
                parameter,
            })
        })
        .collect()
}

pub fn parse_triggers(table: &SheetTable) -> Vec<TriggerSpec> {
    table
        .records()
        .filter_map(|record| {
            let name = record.get(columns::NAME)?;
            let kind = record.get(columns::TYPE).unwrap_or(PAGEVIEW_TRIGGER);

            let custom_event_filter = record
                .get(columns::EVENT_NAME)
                .filter(|_| kind == CUSTOM_EVENT_TRIGGER)
                .map(event_equals_filter);

            let filter = record.get(columns::FILTER_TYPE).map(|filter_type| {
                let parameter = record
                    .get(columns::FILTER_PARAMETER)
                    .map(split_filter_parameters)
                    .unwrap_or_default();
                json!([{ "type": filter_type, "parameter": parameter }])
            });

            Some(TriggerSpec {
                name: name.to_string(),
                kind: kind.to_string(),
                filter,
                custom_event_filter,
                auto_event_filter: None,
            })
        })
        .collect()
}

pub fn parse_tags(table: &SheetTable) -> Vec<TagSpec> {
    table
        .records()
        .filter_map(|record| {
            let name = record.get(columns::NAME)?;
            let kind = record.get(columns::TYPE).unwrap_or(HTML_TAG);

            let mut parameter = Vec::new();
            if kind == HTML_TAG
                && let Some(html) = record.get(columns::HTML)
            {
                parameter.push(Parameter::template(columns::HTML, html));
            }
            parameter.extend(paired_parameters(&record));

            Some(TagSpec {
                name: name.to_string(),
                kind: kind.to_string(),
                parameter,
                firing_trigger_id: record.get(columns::FIRING_TRIGGERS).map(split_names),
                blocking_trigger_id: record.get(columns::BLOCKING_TRIGGERS).map(split_names),
            })
        })
        .collect()
}

/// `customEventFilter` matching the data layer event name exactly.
pub fn event_equals_filter(event_name: &str) -> Value {
    json!([{
        "type": "equals",
        "parameter": [
            { "type": TEMPLATE_PARAMETER, "key": "arg0", "value": EVENT_NAME_TOKEN },
            { "type": TEMPLATE_PARAMETER, "key": "arg1", "value": event_name },
        ]
    }])
}

/// Zips `parameter_key` and `parameter_value` by position.
///
/// Keys drive the count; a key without a value gets `""`.
fn paired_parameters(record: &SheetRecord<'_>) -> Vec<Parameter> {
    let Some(keys) = record.get(columns::PARAMETER_KEY) else {
        return Vec::new();
    };
    let values = record.get(columns::PARAMETER_VALUE).unwrap_or_default();
    pair_parameters(keys, values)
}

pub fn pair_parameters(keys: &str, values: &str) -> Vec<Parameter> {
    let mut values = values.split(LIST_SEPARATOR);
    keys.split(LIST_SEPARATOR)
        .map(|key| Parameter::template(key.trim(), values.next().unwrap_or_default().trim()))
        .collect()
}

/// Parses `key:value|key:value`, splitting each segment on its first colon.
///
/// Segments without a colon are ignored.
pub fn split_filter_parameters(raw: &str) -> Vec<Value> {
    raw.split(LIST_SEPARATOR)
        .filter_map(|segment| segment.split_once(':'))
        .map(|(key, value)| {
            json!({ "type": TEMPLATE_PARAMETER, "key": key.trim(), "value": value.trim() })
        })
        .collect()
}

/// Splits a trigger-name cell. Empty segments are kept.
pub fn split_names(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATOR)
        .map(|name| name.trim().to_string())
        .collect()
}
