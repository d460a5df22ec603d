//! Registration form models

use std::collections::{BTreeSet, HashMap};
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

/// Field-type vocabulary of the form engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Text,
    Email,
    Number,
    Dropdown,
    Checkbox,
    Textarea,
    Date,
    Phone,
    Radio,
}

impl FieldType {
    /// Whether the field carries an option list
    pub fn has_options(self) -> bool {
        matches!(self, FieldType::Dropdown | FieldType::Checkbox | FieldType::Radio)
    }

    /// Whether the field holds a set of selections rather than a scalar
    pub fn is_multi_select(self) -> bool {
        matches!(self, FieldType::Checkbox)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldType::Text => "TEXT",
            FieldType::Email => "EMAIL",
            FieldType::Number => "NUMBER",
            FieldType::Dropdown => "DROPDOWN",
            FieldType::Checkbox => "CHECKBOX",
            FieldType::Textarea => "TEXTAREA",
            FieldType::Date => "DATE",
            FieldType::Phone => "PHONE",
            FieldType::Radio => "RADIO",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[serde(default)]
    pub id: Option<i64>,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub order_index: u32,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default, with = "crate::forms::schema::options_json")]
    pub options: Vec<String>,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
}

impl FieldDefinition {
    /// Create an optional field with no constraints
    pub fn new(id: Option<i64>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id,
            label: label.into(),
            field_type,
            required: false,
            order_index: 0,
            placeholder: None,
            help_text: None,
            options: Vec::new(),
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "super::timestamp::option")]
    pub deadline: Option<NaiveDateTime>,
    /// Forms served from the active-forms endpoint may omit the flag
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub max_responses: Option<i32>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

fn default_active() -> bool {
    true
}

impl FormDefinition {
    /// Create an unsaved, active draft
    pub fn draft(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: None,
            deadline: None,
            is_active: true,
            max_responses: None,
            fields: Vec::new(),
        }
    }

    /// Find a field by its persisted id
    pub fn field(&self, field_id: i64) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == Some(field_id))
    }

    /// Fields in display order
    pub fn ordered_fields(&self) -> Vec<FieldDefinition> {
        let mut fields = self.fields.clone();
        fields.sort_by_key(|f| f.order_index);
        fields
    }

    /// Whether the form still takes submissions at `now`
    pub fn is_accepting_responses(&self, now: NaiveDateTime) -> bool {
        self.is_active && self.deadline.map_or(true, |deadline| now <= deadline)
    }
}

/// In-memory answer to one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Selection(BTreeSet<String>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn selection<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Selection(values.into_iter().map(Into::into).collect())
    }

    /// Empty string or empty selection
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Selection(set) => set.is_empty(),
        }
    }

    /// Scalar view of the value; selections are comma-joined
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Selection(set) => set.iter().cloned().collect::<Vec<_>>().join(","),
        }
    }
}

/// Answers keyed by persisted field id
pub type ResponseMap = HashMap<i64, FieldValue>;
