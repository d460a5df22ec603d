//! Per-field validation
//!
//! Rules are applied in a fixed precedence: required/empty first, then the
//! type-specific rule. At most one message is produced per field.

use std::collections::BTreeMap;
use std::sync::OnceLock;
use regex::Regex;
use crate::models::{FieldDefinition, FieldType, FieldValue, ResponseMap};

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const INVALID_PHONE_MESSAGE: &str = "Please enter a valid phone number with at least 10 digits";
pub const INVALID_NUMBER_MESSAGE: &str = "Please enter a valid number";

/// Minimum digit count for a phone number
pub const MIN_PHONE_DIGITS: usize = 10;

/// Identifies a field in an error set; drafts have no id yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Persisted(i64),
    Draft(u32),
}

impl FieldKey {
    pub fn of(field: &FieldDefinition) -> Self {
        match field.id {
            Some(id) => FieldKey::Persisted(id),
            None => FieldKey::Draft(field.order_index),
        }
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKey::Persisted(id) => write!(f, "field {}", id),
            FieldKey::Draft(index) => write!(f, "draft field #{}", index),
        }
    }
}

/// Validation failure for a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub key: FieldKey,
    pub message: String,
}

/// Error set keyed by field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<FieldKey, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, error: FieldError) {
        self.errors.insert(error.key, error.message);
    }

    pub fn remove(&mut self, key: FieldKey) {
        self.errors.remove(&key);
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.errors.get(&key).map(String::as_str)
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.errors.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// First message in field order
    pub fn first_message(&self) -> Option<&str> {
        self.errors.values().next().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &String)> {
        self.errors.iter()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(key, message)| format!("{}: {}", key, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

/// Validate one answer against its field definition
pub fn validate_field(field: &FieldDefinition, value: Option<&FieldValue>) -> Result<(), FieldError> {
    let key = FieldKey::of(field);
    let fail = |message: String| Err(FieldError { key, message });

    let value = match value {
        Some(value) if !value.is_empty() => value,
        _ if field.required => return fail(format!("{} is required", field.label)),
        _ => return Ok(()),
    };

    let text = value.as_text();
    let text = text.trim();

    match field.field_type {
        FieldType::Email => {
            if !email_pattern().is_match(text) {
                return fail(INVALID_EMAIL_MESSAGE.to_string());
            }
        }
        FieldType::Phone => {
            let digits = text.chars().filter(|c| c.is_ascii_digit()).count();
            if digits < MIN_PHONE_DIGITS {
                return fail(INVALID_PHONE_MESSAGE.to_string());
            }
        }
        FieldType::Number => {
            let number = match text.parse::<f64>() {
                Ok(number) if number.is_finite() => number,
                _ => return fail(INVALID_NUMBER_MESSAGE.to_string()),
            };
            if let Some(min) = field.min_value {
                if number < min {
                    return fail(format!("Value must be at least {}", min));
                }
            }
            if let Some(max) = field.max_value {
                if number > max {
                    return fail(format!("Value must be at most {}", max));
                }
            }
        }
        FieldType::Text => {
            let length = text.chars().count();
            if let Some(min) = field.min_length {
                if length < min {
                    return fail(format!("Must be at least {} characters", min));
                }
            }
            if let Some(max) = field.max_length {
                if length > max {
                    return fail(format!("Must be at most {} characters", max));
                }
            }
        }
        FieldType::Dropdown
        | FieldType::Checkbox
        | FieldType::Textarea
        | FieldType::Date
        | FieldType::Radio => {}
    }

    Ok(())
}

/// Validate a set of fields against the current answers
pub fn validate_fields<'a, I>(fields: I, responses: &ResponseMap) -> ValidationErrors
where
    I: IntoIterator<Item = &'a FieldDefinition>,
{
    let mut errors = ValidationErrors::new();
    for field in fields {
        let value = field.id.and_then(|id| responses.get(&id));
        if let Err(error) = validate_field(field, value) {
            errors.insert(error);
        }
    }
    errors
}
