//! Registration store
//!
//! Per-event cache of the event definition, registration status, active form
//! and capacity. All changes go through [`reduce`], a pure function from the
//! previous entry and an action to the next entry. The store is passed by
//! reference to whoever needs it; there is no global instance.

use std::collections::HashMap;
use chrono::Utc;
use crate::models::{CapacitySnapshot, EventDefinition, FormDefinition, RegistrationHandle, RegistrationStatus};
use super::capacity::{release_spot, take_spot, SpotsDisplay};

/// Cached view of one event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventEntry {
    pub event: Option<EventDefinition>,
    pub status: RegistrationStatus,
    pub active_form: Option<FormDefinition>,
    pub capacity: CapacitySnapshot,
    /// Set once the initial load ran; guards one-shot initialization
    pub loaded: bool,
}

/// Where the caller stands in the registration lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationPhase {
    None,
    FormPending { form_id: Option<i64> },
    Registered(RegistrationHandle),
}

impl EventEntry {
    /// Lifecycle phase derived from status and active form
    pub fn phase(&self) -> RegistrationPhase {
        match self.status.handle() {
            Some(handle) => RegistrationPhase::Registered(handle),
            None => match &self.active_form {
                Some(form) => RegistrationPhase::FormPending { form_id: form.id },
                None => RegistrationPhase::None,
            },
        }
    }

    pub fn spots(&self) -> SpotsDisplay {
        SpotsDisplay::resolve(self.event.as_ref(), &self.capacity)
    }
}

/// State changes applied to an entry
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    EventFetched(EventDefinition),
    StatusFetched(RegistrationStatus),
    SpotsFetched(i64),
    ActiveFormFetched(Option<FormDefinition>),
    MarkLoaded,
    Registered(RegistrationHandle),
    Unregistered,
    Invalidate,
}

/// Pure reducer for a single event entry
pub fn reduce(mut entry: EventEntry, action: StoreAction) -> EventEntry {
    match action {
        StoreAction::EventFetched(event) => {
            entry.event = Some(event);
        }
        StoreAction::StatusFetched(status) => {
            entry.status = status;
        }
        StoreAction::SpotsFetched(spots) => {
            entry.capacity = CapacitySnapshot {
                available_spots: Some(spots),
                fetched_at: Some(Utc::now()),
            };
        }
        StoreAction::ActiveFormFetched(form) => {
            entry.active_form = form;
        }
        StoreAction::MarkLoaded => {
            entry.loaded = true;
        }
        StoreAction::Registered(handle) => {
            entry.status = handle.into();
            adjust_capacity(&mut entry, take_spot, |count| (count + 1).max(0));
        }
        StoreAction::Unregistered => {
            entry.status = RegistrationStatus::None;
            adjust_capacity(&mut entry, release_spot, |count| (count - 1).max(0));
        }
        StoreAction::Invalidate => {
            entry.loaded = false;
        }
    }
    entry
}

// Without a fetched count, keep the derived fallback in step via the event counter.
fn adjust_capacity(
    entry: &mut EventEntry,
    spots: fn(Option<i64>) -> Option<i64>,
    registrations: fn(i64) -> i64,
) {
    if entry.capacity.available_spots.is_some() {
        entry.capacity.available_spots = spots(entry.capacity.available_spots);
    } else if let Some(event) = entry.event.as_mut() {
        event.current_registrations = registrations(event.current_registrations);
    }
}

/// Cache of registration state for every event the caller has looked at
#[derive(Debug, Clone, Default)]
pub struct RegistrationStore {
    entries: HashMap<i64, EventEntry>,
}

impl RegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an action to one event's entry
    pub fn dispatch(&mut self, event_id: i64, action: StoreAction) -> &EventEntry {
        let entry = self.entries.remove(&event_id).unwrap_or_default();
        self.entries.insert(event_id, reduce(entry, action));
        &self.entries[&event_id]
    }

    pub fn entry(&self, event_id: i64) -> Option<&EventEntry> {
        self.entries.get(&event_id)
    }

    pub fn status(&self, event_id: i64) -> RegistrationStatus {
        self.entries
            .get(&event_id)
            .map(|e| e.status)
            .unwrap_or_default()
    }

    pub fn phase(&self, event_id: i64) -> RegistrationPhase {
        self.entries
            .get(&event_id)
            .map(EventEntry::phase)
            .unwrap_or(RegistrationPhase::None)
    }

    pub fn available_spots(&self, event_id: i64) -> Option<i64> {
        self.entries
            .get(&event_id)
            .and_then(|e| e.capacity.available_spots)
    }

    pub fn spots(&self, event_id: i64) -> SpotsDisplay {
        self.entries
            .get(&event_id)
            .map(EventEntry::spots)
            .unwrap_or(SpotsDisplay::Unknown)
    }

    pub fn is_loaded(&self, event_id: i64) -> bool {
        self.entries.get(&event_id).is_some_and(|e| e.loaded)
    }

    /// Drop everything cached for an event
    pub fn forget(&mut self, event_id: i64) {
        self.entries.remove(&event_id);
    }
}
