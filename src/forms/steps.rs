//! Multi-step form navigation
//!
//! Fields are shown three at a time. Moving forward re-validates every field up
//! to and including the current step; moving back never validates.

use tracing::debug;
use crate::forms::schema::sanitize_phone_input;
use crate::forms::validator::{validate_fields, FieldKey, ValidationErrors};
use crate::models::{FieldDefinition, FieldType, FieldValue, FormDefinition, ResponseMap};

/// Number of fields rendered per step
pub const FIELDS_PER_STEP: usize = 3;

/// Steps needed for a field count; an empty form still has one step
pub fn total_steps(field_count: usize) -> usize {
    field_count.div_ceil(FIELDS_PER_STEP).max(1)
}

/// Drives forward/back navigation over a paginated field list
#[derive(Debug, Clone)]
pub struct FormStepController {
    fields: Vec<FieldDefinition>,
    current_step: usize,
    responses: ResponseMap,
    errors: ValidationErrors,
}

impl FormStepController {
    /// Create a controller positioned on the first step
    pub fn new(form: &FormDefinition) -> Self {
        Self {
            fields: form.ordered_fields(),
            current_step: 0,
            responses: ResponseMap::new(),
            errors: ValidationErrors::new(),
        }
    }

    /// Pre-fill answers, e.g. from a prior submission being edited
    pub fn with_responses(mut self, responses: ResponseMap) -> Self {
        self.responses = responses;
        self
    }

    pub fn total_steps(&self) -> usize {
        total_steps(self.fields.len())
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn is_first_step(&self) -> bool {
        self.current_step == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step == self.total_steps() - 1
    }

    /// Fields shown on a given step
    pub fn step_fields(&self, step: usize) -> &[FieldDefinition] {
        let start = step.saturating_mul(FIELDS_PER_STEP).min(self.fields.len());
        let end = start.saturating_add(FIELDS_PER_STEP).min(self.fields.len());
        &self.fields[start..end]
    }

    pub fn current_fields(&self) -> &[FieldDefinition] {
        self.step_fields(self.current_step)
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn responses(&self) -> &ResponseMap {
        &self.responses
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Record a typed answer; phone input is sanitized as it arrives
    pub fn set_text(&mut self, field_id: i64, input: &str) {
        let value = match self.field_type(field_id) {
            Some(FieldType::Phone) => sanitize_phone_input(input),
            _ => input.to_string(),
        };
        self.set_value(field_id, FieldValue::Text(value));
    }

    /// Flip one checkbox option on or off
    pub fn toggle_option(&mut self, field_id: i64, option: &str) {
        let mut selected = match self.responses.remove(&field_id) {
            Some(FieldValue::Selection(set)) => set,
            _ => Default::default(),
        };
        if !selected.remove(option) {
            selected.insert(option.to_string());
        }
        self.set_value(field_id, FieldValue::Selection(selected));
    }

    /// Record an answer and clear any error shown for that field
    pub fn set_value(&mut self, field_id: i64, value: FieldValue) {
        self.errors.remove(FieldKey::Persisted(field_id));
        self.responses.insert(field_id, value);
    }

    /// Advance one step if every field seen so far is valid
    pub fn next(&mut self) -> Result<usize, ValidationErrors> {
        let seen = ((self.current_step + 1) * FIELDS_PER_STEP).min(self.fields.len());
        let errors = validate_fields(&self.fields[..seen], &self.responses);

        if !errors.is_empty() {
            debug!(step = self.current_step, errors = errors.len(), "Step navigation blocked by validation");
            self.errors = errors.clone();
            return Err(errors);
        }

        self.errors.clear();
        if !self.is_last_step() {
            self.current_step += 1;
        }
        Ok(self.current_step)
    }

    /// Go back one step; returns false on the first step
    pub fn back(&mut self) -> bool {
        if self.current_step == 0 {
            return false;
        }
        self.current_step -= 1;
        true
    }

    /// Validate the whole form and hand back the answers
    ///
    /// Works from any step, not only the last one: every field is checked
    /// regardless of how far navigation got, so callers that fill answers
    /// without stepping through the form can submit directly.
    pub fn submit(&mut self) -> Result<ResponseMap, ValidationErrors> {
        let errors = validate_fields(&self.fields, &self.responses);
        if !errors.is_empty() {
            debug!(errors = errors.len(), "Form submission blocked by validation");
            self.errors = errors.clone();
            return Err(errors);
        }

        self.errors.clear();
        Ok(self.responses.clone())
    }

    fn field_type(&self, field_id: i64) -> Option<FieldType> {
        self.fields
            .iter()
            .find(|f| f.id == Some(field_id))
            .map(|f| f.field_type)
    }
}
