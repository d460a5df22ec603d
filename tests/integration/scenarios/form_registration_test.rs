//! Form-backed registration scenarios
//!
//! Validation gating, the create/update submission split, checkbox encoding
//! on the wire and reading a submission back for editing.

use assert_matches::assert_matches;
use serde_json::{json, Value};
use serial_test::serial;

use crate::helpers::*;
use CampusLink::forms::validator::{FieldKey, INVALID_EMAIL_MESSAGE};
use CampusLink::models::{FieldValue, FormDefinition, RegistrationStatus, ResponseMap};
use CampusLink::state::RegistrationPhase;
use CampusLink::CampusLinkError;

fn answers(name: &str, email: &str, topics: &[&str]) -> ResponseMap {
    let mut responses = ResponseMap::new();
    responses.insert(NAME_FIELD, FieldValue::text(name));
    responses.insert(EMAIL_FIELD, FieldValue::text(email));
    if !topics.is_empty() {
        responses.insert(TOPICS_FIELD, FieldValue::selection(topics.iter().copied()));
    }
    responses
}

fn wire_answers(name: &str, email: &str, topics: &str) -> Value {
    json!([
        { "fieldId": NAME_FIELD, "value": name },
        { "fieldId": EMAIL_FIELD, "value": email },
        { "fieldId": TOPICS_FIELD, "value": topics }
    ])
}

/// Event with an active signup form; status responses are supplied by the caller
async fn mount_form_event(mock: &EventApiMockServer, form: Value) {
    mock.mock_event(event_json(EVENT_ID, Some(5), 0)).await;
    mock.mock_active_forms(EVENT_ID, json!([form])).await;
}

#[tokio::test]
#[serial]
async fn test_invalid_email_blocks_submission() {
    let mut ctx = TestContext::new().await;
    mount_form_event(&ctx.api_mock, signup_form_json(FORM_ID)).await;
    ctx.api_mock.mock_registration_status(EVENT_ID, not_registered(), None).await;
    ctx.api_mock.mock_available_spots(EVENT_ID, 5, None).await;

    let machine = ctx.machine();
    machine.load_status(&mut ctx.store, EVENT_ID, &ctx.cancel).await.unwrap();

    let responses = answers("Ada Lovelace", "not-an-email", &[]);
    let result = machine
        .register_with_form(&mut ctx.store, EVENT_ID, FORM_ID, &responses, &ctx.cancel)
        .await;

    let errors = match result {
        Err(CampusLinkError::Validation(errors)) => errors,
        other => panic!("Expected validation errors, got {:?}", other),
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get(FieldKey::Persisted(EMAIL_FIELD)), Some(INVALID_EMAIL_MESSAGE));
    assert_eq!(ctx.api_mock.count("POST", &submission_path(EVENT_ID, FORM_ID)).await, 0);
    assert_eq!(ctx.store.phase(EVENT_ID), RegistrationPhase::FormPending { form_id: Some(FORM_ID) });
    assert_eq!(ctx.store.available_spots(EVENT_ID), Some(5));
}

#[tokio::test]
#[serial]
async fn test_missing_required_field_is_reported() {
    let mut ctx = TestContext::new().await;
    mount_form_event(&ctx.api_mock, signup_form_json(FORM_ID)).await;
    ctx.api_mock.mock_registration_status(EVENT_ID, not_registered(), None).await;
    ctx.api_mock.mock_available_spots(EVENT_ID, 5, None).await;

    let machine = ctx.machine();
    machine.load_status(&mut ctx.store, EVENT_ID, &ctx.cancel).await.unwrap();

    let responses = answers("   ", "ada@example.edu", &[]);
    let error = machine
        .register_with_form(&mut ctx.store, EVENT_ID, FORM_ID, &responses, &ctx.cancel)
        .await
        .unwrap_err();

    assert_eq!(error.user_message(), "Full name is required");
}

#[tokio::test]
#[serial]
async fn test_checkbox_round_trip() {
    let mut ctx = TestContext::new().await;
    mount_form_event(&ctx.api_mock, signup_form_json(FORM_ID)).await;
    ctx.api_mock.mock_registration_status(EVENT_ID, not_registered(), Some(1)).await;
    ctx.api_mock.mock_registration_status(EVENT_ID, registered_with_form(FORM_ID), None).await;
    ctx.api_mock.mock_available_spots(EVENT_ID, 5, Some(1)).await;
    ctx.api_mock.mock_available_spots(EVENT_ID, 4, None).await;

    let wire = wire_answers("Ada Lovelace", "ada@example.edu", "A,C");
    ctx.api_mock
        .mock_submit_form(
            EVENT_ID,
            FORM_ID,
            json!({ "responses": wire.clone() }),
            submission_json(EVENT_ID, FORM_ID, wire.clone()),
        )
        .await;
    ctx.api_mock
        .mock_get_submission(EVENT_ID, FORM_ID, submission_json(EVENT_ID, FORM_ID, wire))
        .await;

    let machine = ctx.machine();
    machine.load_status(&mut ctx.store, EVENT_ID, &ctx.cancel).await.unwrap();

    let responses = answers("Ada Lovelace", "ada@example.edu", &["C", "A"]);
    let record = machine
        .register_with_form(&mut ctx.store, EVENT_ID, FORM_ID, &responses, &ctx.cancel)
        .await
        .expect("Submission should match the expected payload");

    assert_eq!(record.id, Some(500));
    assert_eq!(ctx.store.status(EVENT_ID), RegistrationStatus::FormBacked(FORM_ID));
    assert_eq!(ctx.store.available_spots(EVENT_ID), Some(4));

    let previous = machine
        .load_submission_for_edit(&ctx.store, EVENT_ID, &ctx.cancel)
        .await
        .expect("Previous answers should load");

    assert_eq!(previous.get(&TOPICS_FIELD), Some(&FieldValue::selection(["A", "C"])));
    assert_eq!(previous.get(&NAME_FIELD), Some(&FieldValue::text("Ada Lovelace")));
}

#[tokio::test]
#[serial]
async fn test_update_uses_put_and_keeps_state() {
    let mut ctx = TestContext::new().await;
    mount_form_event(&ctx.api_mock, signup_form_json(FORM_ID)).await;
    ctx.api_mock.mock_registration_status(EVENT_ID, registered_with_form(FORM_ID), None).await;
    ctx.api_mock.mock_available_spots(EVENT_ID, 4, None).await;
    ctx.api_mock
        .mock_update_submission(
            EVENT_ID,
            FORM_ID,
            submission_json(EVENT_ID, FORM_ID, wire_answers("Ada King", "ada@example.edu", "B")),
        )
        .await;

    let machine = ctx.machine();
    machine.load_status(&mut ctx.store, EVENT_ID, &ctx.cancel).await.unwrap();

    let responses = answers("Ada King", "ada@example.edu", &["B"]);
    machine
        .update_form_registration(&mut ctx.store, EVENT_ID, FORM_ID, &responses, &ctx.cancel)
        .await
        .expect("Update should succeed");

    let path = submission_path(EVENT_ID, FORM_ID);
    assert_eq!(ctx.api_mock.count("PUT", &path).await, 1);
    assert_eq!(ctx.api_mock.count("POST", &path).await, 0);
    assert_eq!(ctx.store.status(EVENT_ID), RegistrationStatus::FormBacked(FORM_ID));
    assert_eq!(ctx.store.available_spots(EVENT_ID), Some(4));
}

#[tokio::test]
#[serial]
async fn test_update_requires_registration() {
    let mut ctx = TestContext::new().await;
    mount_form_event(&ctx.api_mock, signup_form_json(FORM_ID)).await;
    ctx.api_mock.mock_registration_status(EVENT_ID, not_registered(), None).await;
    ctx.api_mock.mock_available_spots(EVENT_ID, 5, None).await;

    let machine = ctx.machine();
    machine.load_status(&mut ctx.store, EVENT_ID, &ctx.cancel).await.unwrap();

    let responses = answers("Ada", "ada@example.edu", &[]);
    let result = machine
        .update_form_registration(&mut ctx.store, EVENT_ID, FORM_ID, &responses, &ctx.cancel)
        .await;

    assert_matches!(result, Err(CampusLinkError::InvalidStateTransition { .. }));
    assert_eq!(ctx.api_mock.count("PUT", &submission_path(EVENT_ID, FORM_ID)).await, 0);
}

#[tokio::test]
#[serial]
async fn test_closed_form_rejected_locally() {
    let mut ctx = TestContext::new().await;
    mount_form_event(&ctx.api_mock, closed_form_json(FORM_ID)).await;
    ctx.api_mock.mock_registration_status(EVENT_ID, not_registered(), None).await;
    ctx.api_mock.mock_available_spots(EVENT_ID, 5, None).await;

    let machine = ctx.machine();
    machine.load_status(&mut ctx.store, EVENT_ID, &ctx.cancel).await.unwrap();

    let responses = answers("Ada", "ada@example.edu", &[]);
    let result = machine
        .register_with_form(&mut ctx.store, EVENT_ID, FORM_ID, &responses, &ctx.cancel)
        .await;

    assert_matches!(result, Err(CampusLinkError::RegistrationClosed { .. }));
    assert_eq!(ctx.api_mock.count("POST", &submission_path(EVENT_ID, FORM_ID)).await, 0);
}

#[tokio::test]
#[serial]
async fn test_unknown_form_id() {
    let mut ctx = TestContext::new().await;
    mount_form_event(&ctx.api_mock, signup_form_json(FORM_ID)).await;
    ctx.api_mock.mock_registration_status(EVENT_ID, not_registered(), None).await;
    ctx.api_mock.mock_available_spots(EVENT_ID, 5, None).await;

    let machine = ctx.machine();
    machine.load_status(&mut ctx.store, EVENT_ID, &ctx.cancel).await.unwrap();

    let result = machine
        .register_with_form(&mut ctx.store, EVENT_ID, 999, &ResponseMap::new(), &ctx.cancel)
        .await;
    assert_matches!(result, Err(CampusLinkError::FormNotFound { form_id: 999, .. }));
}

#[tokio::test]
#[serial]
async fn test_coordinator_mode_follows_existing_flag() {
    let ctx = TestContext::new().await;
    let form: FormDefinition = serde_json::from_value(signup_form_json(FORM_ID)).unwrap();
    let wire = wire_answers("Ada", "ada@example.edu", "B");

    ctx.api_mock
        .mock_submit_form(
            EVENT_ID,
            FORM_ID,
            json!({ "responses": wire.clone() }),
            submission_json(EVENT_ID, FORM_ID, wire.clone()),
        )
        .await;
    ctx.api_mock
        .mock_update_submission(EVENT_ID, FORM_ID, submission_json(EVENT_ID, FORM_ID, wire))
        .await;

    let responses = answers("Ada", "ada@example.edu", &["B"]);
    let path = submission_path(EVENT_ID, FORM_ID);

    ctx.services.submissions.submit(EVENT_ID, &form, &responses, false).await.unwrap();
    assert_eq!(ctx.api_mock.count("POST", &path).await, 1);
    assert_eq!(ctx.api_mock.count("PUT", &path).await, 0);

    ctx.services.submissions.submit(EVENT_ID, &form, &responses, true).await.unwrap();
    assert_eq!(ctx.api_mock.count("POST", &path).await, 1);
    assert_eq!(ctx.api_mock.count("PUT", &path).await, 1);
}

#[tokio::test]
#[serial]
async fn test_form_without_active_flag_accepts_registration() {
    let mut ctx = TestContext::new().await;
    let mut form = signup_form_json(FORM_ID);
    form.as_object_mut().unwrap().remove("isActive");
    mount_form_event(&ctx.api_mock, form).await;
    ctx.api_mock.mock_registration_status(EVENT_ID, not_registered(), Some(1)).await;
    ctx.api_mock.mock_registration_status(EVENT_ID, registered_with_form(FORM_ID), None).await;
    ctx.api_mock.mock_available_spots(EVENT_ID, 5, Some(1)).await;
    ctx.api_mock.mock_available_spots(EVENT_ID, 4, None).await;

    let wire = wire_answers("Ada Lovelace", "ada@example.edu", "B");
    ctx.api_mock
        .mock_submit_form(
            EVENT_ID,
            FORM_ID,
            json!({ "responses": wire.clone() }),
            submission_json(EVENT_ID, FORM_ID, wire),
        )
        .await;

    let machine = ctx.machine();
    machine.load_status(&mut ctx.store, EVENT_ID, &ctx.cancel).await.unwrap();
    assert_eq!(ctx.store.phase(EVENT_ID), RegistrationPhase::FormPending { form_id: Some(FORM_ID) });

    let responses = answers("Ada Lovelace", "ada@example.edu", &["B"]);
    machine
        .register_with_form(&mut ctx.store, EVENT_ID, FORM_ID, &responses, &ctx.cancel)
        .await
        .expect("A form without the flag is active");

    assert_eq!(ctx.store.status(EVENT_ID), RegistrationStatus::FormBacked(FORM_ID));
    assert_eq!(ctx.store.available_spots(EVENT_ID), Some(4));
}

#[tokio::test]
#[serial]
async fn test_inactive_form_is_not_offered() {
    let mut ctx = TestContext::new().await;
    let mut form = signup_form_json(FORM_ID);
    form["isActive"] = json!(false);
    mount_form_event(&ctx.api_mock, form).await;
    ctx.api_mock.mock_registration_status(EVENT_ID, not_registered(), None).await;
    ctx.api_mock.mock_available_spots(EVENT_ID, 5, None).await;

    let machine = ctx.machine();
    machine.load_status(&mut ctx.store, EVENT_ID, &ctx.cancel).await.unwrap();

    assert_eq!(ctx.store.phase(EVENT_ID), RegistrationPhase::None);
    let result = machine
        .register_with_form(&mut ctx.store, EVENT_ID, FORM_ID, &ResponseMap::new(), &ctx.cancel)
        .await;
    assert_matches!(result, Err(CampusLinkError::FormNotFound { form_id: FORM_ID, .. }));
}
