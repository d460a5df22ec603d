//! Test data helpers for creating API payloads
//!
//! Events default to a far-future window so they never count as past.

use serde_json::{json, Value};

pub const EVENT_ID: i64 = 1;
pub const FORM_ID: i64 = 7;

pub const NAME_FIELD: i64 = 11;
pub const EMAIL_FIELD: i64 = 12;
pub const TOPICS_FIELD: i64 = 13;

/// Event payload with the given capacity
pub fn event_json(event_id: i64, max_participants: Option<i32>, current_registrations: i64) -> Value {
    json!({
        "id": event_id,
        "title": "Intro to Rust Meetup",
        "description": "Bring a laptop.",
        "startTime": "2099-05-01T18:00:00",
        "endTime": "2099-05-01T20:00:00",
        "location": "Engineering Hall 2",
        "maxParticipants": max_participants,
        "currentRegistrations": current_registrations,
        "createdBy": 99
    })
}

/// Event that ended long ago
pub fn past_event_json(event_id: i64) -> Value {
    json!({
        "id": event_id,
        "title": "Orientation",
        "startTime": "2001-09-01T09:00:00",
        "endTime": "2001-09-01T12:00:00",
        "maxParticipants": 50,
        "currentRegistrations": 10
    })
}

/// Status body for someone not registered
pub fn not_registered() -> Value {
    json!({ "registered": false })
}

/// Status body for a plain registration, using the `-1` form id marker
pub fn registered_simple() -> Value {
    json!({ "registered": true, "formId": -1 })
}

/// Status body for a registration made through a form
pub fn registered_with_form(form_id: i64) -> Value {
    json!({ "registered": true, "formId": form_id })
}

/// Signup form: required name, required email, optional checkbox topics
pub fn signup_form_json(form_id: i64) -> Value {
    json!({
        "id": form_id,
        "title": "Meetup signup",
        "isActive": true,
        "fields": [
            { "id": NAME_FIELD, "label": "Full name", "type": "TEXT", "required": true, "orderIndex": 1 },
            { "id": EMAIL_FIELD, "label": "Email", "type": "EMAIL", "required": true, "orderIndex": 2 },
            {
                "id": TOPICS_FIELD,
                "label": "Topics",
                "type": "CHECKBOX",
                "required": false,
                "orderIndex": 3,
                "options": "[\"A\",\"B\",\"C\"]"
            }
        ]
    })
}

/// Same form with a deadline in the past
pub fn closed_form_json(form_id: i64) -> Value {
    let mut form = signup_form_json(form_id);
    form["deadline"] = json!("2001-01-01T00:00:00");
    form
}

/// Submission record echoing the given answers
pub fn submission_json(event_id: i64, form_id: i64, responses: Value) -> Value {
    json!({
        "id": 500,
        "formId": form_id,
        "eventId": event_id,
        "responses": responses,
        "submittedAt": "2099-04-01T12:00:00"
    })
}
