//! Registration and submission models
//!
//! The event API reports "registered without a form" through the form id
//! channel using the sentinel `-1`. That sentinel is decoded here, once, into
//! [`RegistrationStatus`] and never travels further into the crate.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

/// Form id the API uses to mean "registered without a form"
pub const SIMPLE_REGISTRATION_SENTINEL: i64 = -1;

/// How, if at all, the caller is registered for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegistrationStatus {
    #[default]
    None,
    Simple,
    FormBacked(i64),
}

/// Proof of an existing registration, needed to pick the unregister path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationHandle {
    Simple,
    FormBacked(i64),
}

impl RegistrationStatus {
    /// Decode the wire representation
    pub fn from_wire(registered: Option<bool>, form_id: Option<i64>) -> Self {
        let registered = registered.unwrap_or(form_id.is_some());
        if !registered {
            return RegistrationStatus::None;
        }

        match form_id {
            None | Some(SIMPLE_REGISTRATION_SENTINEL) => RegistrationStatus::Simple,
            Some(id) if id > 0 => RegistrationStatus::FormBacked(id),
            Some(id) => {
                warn!(form_id = id, "Unexpected non-positive form id in registration status, treating as simple registration");
                RegistrationStatus::Simple
            }
        }
    }

    pub fn is_registered(&self) -> bool {
        !matches!(self, RegistrationStatus::None)
    }

    pub fn handle(&self) -> Option<RegistrationHandle> {
        match self {
            RegistrationStatus::None => None,
            RegistrationStatus::Simple => Some(RegistrationHandle::Simple),
            RegistrationStatus::FormBacked(id) => Some(RegistrationHandle::FormBacked(*id)),
        }
    }
}

impl From<RegistrationHandle> for RegistrationStatus {
    fn from(handle: RegistrationHandle) -> Self {
        match handle {
            RegistrationHandle::Simple => RegistrationStatus::Simple,
            RegistrationHandle::FormBacked(id) => RegistrationStatus::FormBacked(id),
        }
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationStatus::None => write!(f, "not registered"),
            RegistrationStatus::Simple => write!(f, "registered"),
            RegistrationStatus::FormBacked(id) => write!(f, "registered via form {}", id),
        }
    }
}

/// Body of the registration status endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStatusResponse {
    #[serde(default, alias = "isRegistered")]
    pub registered: Option<bool>,
    #[serde(default)]
    pub form_id: Option<i64>,
}

impl From<RegistrationStatusResponse> for RegistrationStatus {
    fn from(response: RegistrationStatusResponse) -> Self {
        RegistrationStatus::from_wire(response.registered, response.form_id)
    }
}

/// Body of the available spots endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSpotsResponse {
    pub available_spots: i64,
}

/// Cached capacity for one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapacitySnapshot {
    /// Raw value, possibly negative; `None` until fetched
    pub available_spots: Option<i64>,
    /// When the value was last replaced by a server fetch
    pub fetched_at: Option<DateTime<Utc>>,
}

impl CapacitySnapshot {
    pub fn fetched(available_spots: i64) -> Self {
        Self {
            available_spots: Some(available_spots),
            fetched_at: Some(Utc::now()),
        }
    }
}

/// Server record of a plain registration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub event_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, with = "super::timestamp::option")]
    pub registered_at: Option<NaiveDateTime>,
}

/// One answer as sent to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldResponse {
    pub field_id: i64,
    pub value: String,
}

/// Body of the submit and update endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub responses: Vec<FieldResponse>,
}

/// Server record of a form submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub form_id: Option<i64>,
    #[serde(default)]
    pub event_id: Option<i64>,
    #[serde(default)]
    pub responses: Vec<FieldResponse>,
    #[serde(default, with = "super::timestamp::option")]
    pub submitted_at: Option<NaiveDateTime>,
}
