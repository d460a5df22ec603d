//! Mock event API server for testing
//!
//! This module provides a mock HTTP server that simulates the event and
//! registration backend. It uses wiremock; responses mounted with `times`
//! are served that many times before falling through to later mounts.

use serde_json::{json, Value};
use std::time::Duration;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, Request, ResponseTemplate,
};

/// Mock event API server
pub struct EventApiMockServer {
    pub server: MockServer,
}

impl EventApiMockServer {
    /// Create a new mock event API server
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    async fn mount(&self, http_method: &str, route: String, response: ResponseTemplate, times: Option<u64>) {
        let mock = Mock::given(method(http_method))
            .and(path(route))
            .respond_with(response);
        match times {
            Some(n) => mock.up_to_n_times(n).mount(&self.server).await,
            None => mock.mount(&self.server).await,
        }
    }

    /// Setup mock for the event definition endpoint
    pub async fn mock_event(&self, event: Value) {
        let event_id = event["id"].as_i64().unwrap_or_default();
        self.mount(
            "GET",
            format!("/events/{}", event_id),
            ResponseTemplate::new(200).set_body_json(event),
            None,
        )
        .await;
    }

    /// Setup mock for the available spots endpoint
    pub async fn mock_available_spots(&self, event_id: i64, spots: i64, times: Option<u64>) {
        self.mount(
            "GET",
            format!("/events/{}/available-spots", event_id),
            ResponseTemplate::new(200).set_body_json(json!({ "availableSpots": spots })),
            times,
        )
        .await;
    }

    /// Setup mock for the registration status endpoint
    pub async fn mock_registration_status(&self, event_id: i64, body: Value, times: Option<u64>) {
        self.mount(
            "GET",
            format!("/events/{}/registration-status", event_id),
            ResponseTemplate::new(200).set_body_json(body),
            times,
        )
        .await;
    }

    /// Setup mock for the active forms endpoint
    pub async fn mock_active_forms(&self, event_id: i64, forms: Value) {
        self.mount(
            "GET",
            format!("/events/{}/forms/active", event_id),
            ResponseTemplate::new(200).set_body_json(forms),
            None,
        )
        .await;
    }

    /// Make any GET under an event fail with the given status
    pub async fn mock_failure(&self, route: String, status: u16) {
        self.mount(
            "GET",
            route,
            ResponseTemplate::new(status).set_body_json(json!({ "message": "Internal server error" })),
            None,
        )
        .await;
    }

    /// Setup mock for plain registration
    pub async fn mock_register(&self, event_id: i64, response: ResponseTemplate) {
        self.mount("POST", format!("/events/{}/register", event_id), response, None).await;
    }

    /// Setup mock for plain unregistration
    pub async fn mock_unregister(&self, event_id: i64) {
        self.mount("DELETE", format!("/events/{}/register", event_id), ResponseTemplate::new(204), None).await;
    }

    /// Setup mock for form submission, matching the exact payload
    pub async fn mock_submit_form(&self, event_id: i64, form_id: i64, expected: Value, response: Value) {
        Mock::given(method("POST"))
            .and(path(submission_path(event_id, form_id)))
            .and(body_json(expected))
            .respond_with(ResponseTemplate::new(201).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    /// Setup mock for submission update
    pub async fn mock_update_submission(&self, event_id: i64, form_id: i64, response: Value) {
        self.mount(
            "PUT",
            submission_path(event_id, form_id),
            ResponseTemplate::new(200).set_body_json(response),
            None,
        )
        .await;
    }

    /// Setup mock for submission deletion
    pub async fn mock_delete_submission(&self, event_id: i64, form_id: i64) {
        self.mount("DELETE", submission_path(event_id, form_id), ResponseTemplate::new(204), None).await;
    }

    /// Setup mock for fetching an existing submission
    pub async fn mock_get_submission(&self, event_id: i64, form_id: i64, response: Value) {
        self.mount(
            "GET",
            submission_path(event_id, form_id),
            ResponseTemplate::new(200).set_body_json(response),
            None,
        )
        .await;
    }

    /// A response that only arrives after `delay`
    pub fn delayed(status: u16, body: Value, delay: Duration) -> ResponseTemplate {
        ResponseTemplate::new(status).set_body_json(body).set_delay(delay)
    }

    /// All requests received so far
    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Count received requests with the given method and path
    pub async fn count(&self, http_method: &str, route: &str) -> usize {
        self.requests()
            .await
            .iter()
            .filter(|r| r.method.as_str() == http_method && r.url.path() == route)
            .count()
    }

    /// Reset all mocks and recorded requests
    pub async fn reset(&self) {
        self.server.reset().await;
    }
}

pub fn submission_path(event_id: i64, form_id: i64) -> String {
    format!("/events/{}/forms/{}/submission", event_id, form_id)
}
