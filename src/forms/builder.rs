//! Form definition editing
//!
//! Keeps `orderIndex` 1-based and contiguous through every edit.

use crate::models::{FieldDefinition, FieldType, FormDefinition};
use crate::utils::errors::{CampusLinkError, Result};

impl FormDefinition {
    /// Append a field at the end of the form
    pub fn add_field(&mut self, mut field: FieldDefinition) -> &FieldDefinition {
        if !field.field_type.has_options() {
            field.options.clear();
        }
        self.resequence();
        field.order_index = self.fields.len() as u32 + 1;
        self.fields.push(field);
        &self.fields[self.fields.len() - 1]
    }

    /// Remove the field at a 0-based display position
    pub fn remove_field(&mut self, position: usize) -> Result<FieldDefinition> {
        self.fields.sort_by_key(|f| f.order_index);
        if position >= self.fields.len() {
            return Err(CampusLinkError::InvalidInput(format!(
                "No field at position {} (form has {} fields)",
                position,
                self.fields.len()
            )));
        }
        let removed = self.fields.remove(position);
        self.renumber();
        Ok(removed)
    }

    /// Move a field from one display position to another
    pub fn move_field(&mut self, from: usize, to: usize) -> Result<()> {
        self.fields.sort_by_key(|f| f.order_index);
        let len = self.fields.len();
        if from >= len || to >= len {
            return Err(CampusLinkError::InvalidInput(format!(
                "Cannot move field {} to {} (form has {} fields)",
                from, to, len
            )));
        }
        let field = self.fields.remove(from);
        self.fields.insert(to, field);
        self.renumber();
        Ok(())
    }

    /// Change a field's type; options are dropped for non-choice types
    pub fn set_field_type(&mut self, position: usize, field_type: FieldType) -> Result<()> {
        self.fields.sort_by_key(|f| f.order_index);
        let field = self.fields.get_mut(position).ok_or_else(|| {
            CampusLinkError::InvalidInput(format!("No field at position {}", position))
        })?;

        field.field_type = field_type;
        if !field_type.has_options() {
            field.options.clear();
        }
        if field_type != FieldType::Text {
            field.min_length = None;
            field.max_length = None;
        }
        if field_type != FieldType::Number {
            field.min_value = None;
            field.max_value = None;
        }
        Ok(())
    }

    /// Renumber fields 1..=n in display order
    pub fn resequence(&mut self) {
        self.fields.sort_by_key(|f| f.order_index);
        self.renumber();
    }

    fn renumber(&mut self) {
        for (index, field) in self.fields.iter_mut().enumerate() {
            field.order_index = index as u32 + 1;
        }
    }

    /// Check that the definition can be saved
    pub fn validate_definition(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CampusLinkError::InvalidInput("Form title is required".to_string()));
        }

        if let Some(max) = self.max_responses {
            if max < 0 {
                return Err(CampusLinkError::InvalidInput(
                    "Maximum responses cannot be negative".to_string(),
                ));
            }
        }

        for field in &self.fields {
            if field.label.trim().is_empty() {
                return Err(CampusLinkError::InvalidInput(format!(
                    "Field #{} needs a label",
                    field.order_index
                )));
            }

            if field.field_type.has_options() && field.options.iter().all(|o| o.trim().is_empty()) {
                return Err(CampusLinkError::InvalidInput(format!(
                    "{} needs at least one option",
                    field.label
                )));
            }

            if let (Some(min), Some(max)) = (field.min_length, field.max_length) {
                if min > max {
                    return Err(CampusLinkError::InvalidInput(format!(
                        "{}: minimum length exceeds maximum length",
                        field.label
                    )));
                }
            }

            if let (Some(min), Some(max)) = (field.min_value, field.max_value) {
                if min > max {
                    return Err(CampusLinkError::InvalidInput(format!(
                        "{}: minimum value exceeds maximum value",
                        field.label
                    )));
                }
            }
        }

        Ok(())
    }
}
