//! Field schema encoding
//!
//! Option lists travel as a JSON-stringified array of strings, checkbox answers
//! as a comma-joined string. Everything here is pure and never fails: malformed
//! schema data collapses to an empty option list.

use std::collections::BTreeSet;
use tracing::debug;
use crate::models::{FieldDefinition, FieldResponse, FieldType, FieldValue, FormDefinition, ResponseMap};

/// Separator for checkbox selections on the wire
pub const SELECTION_SEPARATOR: char = ',';

/// Parse a JSON-stringified option list
pub fn parse_options(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => options_from_value(value),
        Err(e) => {
            debug!(error = %e, "Ignoring malformed options JSON");
            Vec::new()
        }
    }
}

/// Serialize an option list for the wire, `None` when there is nothing to send
pub fn serialize_options(options: &[String]) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    serde_json::to_string(options).ok()
}

fn options_from_value(value: serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Serde adapter for `FieldDefinition::options`
pub mod options_json {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(options: &[String], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match super::serialize_options(options) {
            Some(raw) => serializer.serialize_str(&raw),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(serde_json::Value::String(raw)) => super::parse_options(Some(&raw)),
            Some(other) => super::options_from_value(other),
            None => Vec::new(),
        })
    }
}

/// Strip everything a phone number input does not accept
pub fn sanitize_phone_input(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ' ' | '(' | ')' | '-' | '+'))
        .collect()
}

/// Encode an answer for the wire, `None` for empty answers
pub fn encode_value(field: &FieldDefinition, value: &FieldValue) -> Option<String> {
    if value.is_empty() {
        return None;
    }

    match (field.field_type, value) {
        (FieldType::Checkbox, FieldValue::Selection(selected)) => {
            Some(join_selection(&field.options, selected))
        }
        (FieldType::Checkbox, FieldValue::Text(raw)) => {
            let selected = split_selection(raw);
            if selected.is_empty() {
                None
            } else {
                Some(join_selection(&field.options, &selected))
            }
        }
        (_, FieldValue::Text(text)) => Some(text.clone()),
        (_, selection) => Some(selection.as_text()),
    }
}

/// Decode a wire answer according to the field type
pub fn decode_value(field_type: FieldType, raw: &str) -> FieldValue {
    match field_type {
        FieldType::Checkbox => FieldValue::Selection(split_selection(raw)),
        _ => FieldValue::Text(raw.to_string()),
    }
}

/// Decode a prior submission into answers for pre-filling the form
pub fn decode_responses(form: &FormDefinition, responses: &[FieldResponse]) -> ResponseMap {
    responses
        .iter()
        .map(|response| {
            let field_type = form
                .field(response.field_id)
                .map(|f| f.field_type)
                .unwrap_or(FieldType::Text);
            (response.field_id, decode_value(field_type, &response.value))
        })
        .collect()
}

fn split_selection(raw: &str) -> BTreeSet<String> {
    raw.split(SELECTION_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// Declared option order first, unknown selections after in sorted order.
fn join_selection(options: &[String], selected: &BTreeSet<String>) -> String {
    let mut ordered: Vec<&str> = options
        .iter()
        .filter(|option| selected.contains(*option))
        .map(String::as_str)
        .collect();

    ordered.extend(
        selected
            .iter()
            .filter(|s| !options.contains(s))
            .map(String::as_str),
    );

    ordered.join(&SELECTION_SEPARATOR.to_string())
}
