//! Form submission coordinator
//!
//! Turns validated answers into the wire payload and sends it with exactly one
//! call: create for a first submission, update when the caller says a
//! submission already exists. Failures are returned as-is, never retried.

use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::forms::schema::encode_value;
use crate::models::{FieldDefinition, FieldResponse, FormDefinition, ResponseMap, SubmissionRecord};
use crate::services::api::EventApi;
use crate::utils::errors::{CampusLinkError, Result};

/// Which endpoint a submission goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionMode {
    Create,
    Update,
}

impl SubmissionMode {
    /// Pure mode selection from the caller's "existing submission" flag
    pub fn select(existing_submission: bool) -> Self {
        if existing_submission {
            SubmissionMode::Update
        } else {
            SubmissionMode::Create
        }
    }
}

/// Build the wire payload, in field order, skipping empty answers
pub fn build_payload(fields: &[FieldDefinition], responses: &ResponseMap) -> Vec<FieldResponse> {
    let mut ordered: Vec<&FieldDefinition> = fields.iter().collect();
    ordered.sort_by_key(|f| f.order_index);

    let payload: Vec<FieldResponse> = ordered
        .into_iter()
        .filter_map(|field| {
            let field_id = field.id?;
            let value = responses.get(&field_id)?;
            encode_value(field, value).map(|value| FieldResponse { field_id, value })
        })
        .collect();

    let unknown = responses
        .keys()
        .filter(|id| !fields.iter().any(|f| f.id == Some(**id)))
        .count();
    if unknown > 0 {
        debug!(unknown_fields = unknown, "Dropping answers for fields not in the form");
    }

    payload
}

/// Sends form submissions to the event API
#[derive(Clone)]
pub struct SubmissionCoordinator {
    api: Arc<dyn EventApi>,
}

impl SubmissionCoordinator {
    /// Create a new SubmissionCoordinator instance
    pub fn new(api: Arc<dyn EventApi>) -> Self {
        Self { api }
    }

    /// Submit answers for a saved form
    pub async fn submit(
        &self,
        event_id: i64,
        form: &FormDefinition,
        responses: &ResponseMap,
        existing_submission: bool,
    ) -> Result<SubmissionRecord> {
        let form_id = form.id.ok_or_else(|| {
            CampusLinkError::InvalidInput("Cannot submit answers to an unsaved form".to_string())
        })?;

        let payload = build_payload(&form.fields, responses);
        let mode = SubmissionMode::select(existing_submission);

        debug!(event_id = event_id, form_id = form_id, mode = ?mode, answers = payload.len(), "Submitting registration form");

        let result = match mode {
            SubmissionMode::Create => self.api.submit_form(event_id, form_id, payload).await,
            SubmissionMode::Update => self.api.update_form_submission(event_id, form_id, payload).await,
        };

        match &result {
            Ok(record) => info!(event_id = event_id, form_id = form_id, mode = ?mode, submission_id = ?record.id, "Form submission accepted"),
            Err(e) => warn!(event_id = event_id, form_id = form_id, mode = ?mode, error = %e, "Form submission failed"),
        }

        result
    }
}
