//! Event model

use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDefinition {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "super::timestamp")]
    pub start_time: NaiveDateTime,
    #[serde(with = "super::timestamp")]
    pub end_time: NaiveDateTime,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub max_participants: Option<i32>,
    #[serde(default)]
    pub current_registrations: i64,
    #[serde(default)]
    pub created_by: Option<i64>,
}

impl EventDefinition {
    /// Participant limit, `None` when the event has unlimited capacity
    pub fn capacity_limit(&self) -> Option<i64> {
        self.max_participants
            .filter(|max| *max > 0)
            .map(i64::from)
    }

    /// Spots derived from the event counters, used before a capacity fetch
    pub fn derived_available_spots(&self) -> Option<i64> {
        self.capacity_limit()
            .map(|limit| limit - self.current_registrations)
    }
}
