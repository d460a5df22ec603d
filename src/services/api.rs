//! Event API client
//!
//! This service wraps the REST endpoints of the event/registration backend:
//! event lookup, capacity, registration status, active forms, plain
//! registration and form submissions. Non-success responses are turned into
//! [`ApiError`] carrying the server's message when the body has one.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use crate::config::ApiConfig;
use crate::models::{
    AvailableSpotsResponse, EventDefinition, FieldResponse, FormDefinition, RegistrationRecord,
    RegistrationStatus, RegistrationStatusResponse, SubmissionPayload, SubmissionRecord,
};
use crate::utils::errors::{ApiError, CampusLinkError, Result};
use crate::utils::logging::log_api_error;

const LOAD_EVENT_FAILED: &str = "Failed to load event details";
const LOAD_SPOTS_FAILED: &str = "Failed to load available spots";
const LOAD_STATUS_FAILED: &str = "Failed to load registration status";
const LOAD_FORM_FAILED: &str = "Failed to load registration form";
const REGISTER_FAILED: &str = "Failed to register for event";
const UNREGISTER_FAILED: &str = "Failed to unregister from event";
const SUBMIT_FAILED: &str = "Failed to submit registration form";
const UPDATE_FAILED: &str = "Failed to update form submission";
const DELETE_FAILED: &str = "Failed to cancel form registration";
const LOAD_SUBMISSION_FAILED: &str = "Failed to load your previous answers";

/// Operations the registration core needs from the event backend
#[async_trait]
pub trait EventApi: Send + Sync {
    async fn get_event(&self, event_id: i64) -> Result<EventDefinition>;

    async fn get_available_spots(&self, event_id: i64) -> Result<i64>;

    async fn get_registration_status(&self, event_id: i64) -> Result<RegistrationStatus>;

    /// Active forms for the event; logically at most one
    async fn get_active_forms(&self, event_id: i64) -> Result<Vec<FormDefinition>>;

    async fn register_simple(&self, event_id: i64) -> Result<RegistrationRecord>;

    async fn unregister_simple(&self, event_id: i64) -> Result<()>;

    async fn submit_form(&self, event_id: i64, form_id: i64, responses: Vec<FieldResponse>) -> Result<SubmissionRecord>;

    async fn update_form_submission(&self, event_id: i64, form_id: i64, responses: Vec<FieldResponse>) -> Result<SubmissionRecord>;

    async fn delete_form_submission(&self, event_id: i64, form_id: i64) -> Result<()>;

    async fn get_form_submission(&self, event_id: i64, form_id: i64) -> Result<SubmissionRecord>;
}

/// reqwest-backed implementation of [`EventApi`]
#[derive(Clone, Debug)]
pub struct HttpEventApi {
    client: Client,
    base_url: String,
}

impl HttpEventApi {
    /// Create a new HttpEventApi instance
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(CampusLinkError::Http)?;

        // Fail early on a malformed base URL rather than on first request
        url::Url::parse(&config.base_url)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!(method = %method, url = %url, "Event API request");
        self.client.request(method, url)
    }

    /// Send a request and turn non-success statuses into `ApiError`
    async fn send(&self, request: RequestBuilder, fallback: &str) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            log_api_error("event_api", &e.to_string(), Some(fallback));
            CampusLinkError::Http(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ApiError::new(status.as_u16(), extract_error_message(&body), fallback);
        log_api_error("event_api", &error.to_string(), Some(fallback));
        Err(error.into())
    }

    async fn send_json<T>(&self, request: RequestBuilder, fallback: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(request, fallback).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Like `send_json` but an empty body yields the default value
    async fn send_json_or_default<T>(&self, request: RequestBuilder, fallback: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let response = self.send(request, fallback).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(T::default());
        }
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(T::default());
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl EventApi for HttpEventApi {
    async fn get_event(&self, event_id: i64) -> Result<EventDefinition> {
        let request = self.request(Method::GET, &format!("/events/{}", event_id));
        match self.send_json(request, LOAD_EVENT_FAILED).await {
            Err(CampusLinkError::Api(e)) if e.status == 404 => Err(CampusLinkError::EventNotFound { event_id }),
            other => other,
        }
    }

    async fn get_available_spots(&self, event_id: i64) -> Result<i64> {
        let request = self.request(Method::GET, &format!("/events/{}/available-spots", event_id));
        let response: AvailableSpotsResponse = self.send_json(request, LOAD_SPOTS_FAILED).await?;
        Ok(response.available_spots)
    }

    async fn get_registration_status(&self, event_id: i64) -> Result<RegistrationStatus> {
        let request = self.request(Method::GET, &format!("/events/{}/registration-status", event_id));
        let response: RegistrationStatusResponse = self.send_json_or_default(request, LOAD_STATUS_FAILED).await?;
        Ok(response.into())
    }

    async fn get_active_forms(&self, event_id: i64) -> Result<Vec<FormDefinition>> {
        let request = self.request(Method::GET, &format!("/events/{}/forms/active", event_id));
        match self.send_json_or_default(request, LOAD_FORM_FAILED).await {
            Err(CampusLinkError::Api(e)) if e.status == 404 => {
                debug!(event_id = event_id, "No active form for event");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    async fn register_simple(&self, event_id: i64) -> Result<RegistrationRecord> {
        let request = self.request(Method::POST, &format!("/events/{}/register", event_id));
        self.send_json_or_default(request, REGISTER_FAILED).await
    }

    async fn unregister_simple(&self, event_id: i64) -> Result<()> {
        let request = self.request(Method::DELETE, &format!("/events/{}/register", event_id));
        self.send(request, UNREGISTER_FAILED).await?;
        Ok(())
    }

    async fn submit_form(&self, event_id: i64, form_id: i64, responses: Vec<FieldResponse>) -> Result<SubmissionRecord> {
        let request = self
            .request(Method::POST, &submission_path(event_id, form_id))
            .json(&SubmissionPayload { responses });
        self.send_json_or_default(request, SUBMIT_FAILED).await
    }

    async fn update_form_submission(&self, event_id: i64, form_id: i64, responses: Vec<FieldResponse>) -> Result<SubmissionRecord> {
        let request = self
            .request(Method::PUT, &submission_path(event_id, form_id))
            .json(&SubmissionPayload { responses });
        self.send_json_or_default(request, UPDATE_FAILED).await
    }

    async fn delete_form_submission(&self, event_id: i64, form_id: i64) -> Result<()> {
        let request = self.request(Method::DELETE, &submission_path(event_id, form_id));
        self.send(request, DELETE_FAILED).await?;
        Ok(())
    }

    async fn get_form_submission(&self, event_id: i64, form_id: i64) -> Result<SubmissionRecord> {
        let request = self.request(Method::GET, &submission_path(event_id, form_id));
        self.send_json(request, LOAD_SUBMISSION_FAILED).await
    }
}

fn submission_path(event_id: i64, form_id: i64) -> String {
    format!("/events/{}/forms/{}/submission", event_id, form_id)
}

/// Pull a human readable message out of an error body
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => {
            if !body.trim().is_empty() {
                warn!(body_length = body.len(), "Error body is not JSON, using fallback message");
            }
            return None;
        }
    };

    ["message", "error", "detail"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|field| match field {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            serde_json::Value::Object(inner) => inner
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string),
            _ => None,
        })
}
