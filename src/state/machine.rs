//! Registration state machine
//!
//! Lifecycle per event: `None -> FormPending -> Registered(Simple | FormBacked)`
//! and back to `None` through unregister. Every mutation applies an optimistic
//! store update on success and then awaits a refetch of status and capacity
//! that replaces the local numbers. Conflict errors from the server trigger the
//! same refetch instead of a retry.
//!
//! Each operation takes a [`CancellationToken`]. Once the token fires, the
//! pending request is dropped and no transition is applied.

use std::future::Future;
use std::sync::Arc;
use chrono::{Local, NaiveDateTime};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use crate::config::RegistrationConfig;
use crate::forms::schema::decode_responses;
use crate::forms::validator::validate_fields;
use crate::models::{
    FormDefinition, RegistrationHandle, RegistrationRecord, RegistrationStatus, ResponseMap, SubmissionRecord,
};
use crate::services::api::EventApi;
use crate::services::submission::SubmissionCoordinator;
use crate::utils::errors::{CampusLinkError, Result};
use crate::utils::logging::{log_capacity_change, log_registration_action};
use super::capacity::EventStatus;
use super::store::{RegistrationStore, StoreAction};

/// Which parts of a status load succeeded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    pub event: bool,
    pub status: bool,
    pub capacity: bool,
    pub form: bool,
}

impl LoadOutcome {
    pub fn is_complete(&self) -> bool {
        self.event && self.status && self.capacity && self.form
    }
}

/// Run a request unless the token fires first
async fn cancellable<T, F>(cancel: &CancellationToken, request: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CampusLinkError::Cancelled),
        result = request => result,
    }
}

/// Pick the single active form out of the API's list
fn pick_active_form(event_id: i64, forms: Vec<FormDefinition>) -> Option<FormDefinition> {
    if forms.len() > 1 {
        warn!(event_id = event_id, count = forms.len(), "Event has more than one active form, using the first active one");
    }
    forms.into_iter().find(|f| f.is_active)
}

#[derive(Clone)]
pub struct RegistrationStateMachine {
    api: Arc<dyn EventApi>,
    coordinator: SubmissionCoordinator,
    config: RegistrationConfig,
    clock: fn() -> NaiveDateTime,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl RegistrationStateMachine {
    /// Create a new state machine over an event API
    pub fn new(api: Arc<dyn EventApi>, config: RegistrationConfig) -> Self {
        Self {
            coordinator: SubmissionCoordinator::new(api.clone()),
            api,
            config,
            clock: local_now,
        }
    }

    /// Replace the wall clock used for deadline and past-event checks
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Fetch event, status, capacity and active form; each part fails on its own
    pub async fn load_status(
        &self,
        store: &mut RegistrationStore,
        event_id: i64,
        cancel: &CancellationToken,
    ) -> Result<LoadOutcome> {
        debug!(event_id = event_id, "Loading registration status");

        let (event, status, spots, forms) = cancellable(cancel, async {
            Ok(futures::join!(
                self.api.get_event(event_id),
                self.api.get_registration_status(event_id),
                self.api.get_available_spots(event_id),
                self.api.get_active_forms(event_id),
            ))
        })
        .await?;

        let mut outcome = LoadOutcome::default();

        match event {
            Ok(event) => {
                store.dispatch(event_id, StoreAction::EventFetched(event));
                outcome.event = true;
            }
            Err(e) => warn!(event_id = event_id, error = %e, "Failed to load event, keeping last known definition"),
        }

        match status {
            Ok(status) => {
                store.dispatch(event_id, StoreAction::StatusFetched(status));
                outcome.status = true;
            }
            Err(e) => warn!(event_id = event_id, error = %e, "Failed to load registration status, keeping last known status"),
        }

        match spots {
            Ok(spots) => {
                store.dispatch(event_id, StoreAction::SpotsFetched(spots));
                outcome.capacity = true;
            }
            Err(e) => warn!(event_id = event_id, error = %e, "Failed to load available spots, keeping last known count"),
        }

        match forms {
            Ok(forms) => {
                store.dispatch(event_id, StoreAction::ActiveFormFetched(pick_active_form(event_id, forms)));
                outcome.form = true;
            }
            Err(e) => warn!(event_id = event_id, error = %e, "Failed to load active form, keeping last known form"),
        }

        let entry = store.dispatch(event_id, StoreAction::MarkLoaded);
        info!(
            event_id = event_id,
            status = %entry.status,
            spots = %entry.spots(),
            has_form = entry.active_form.is_some(),
            complete = outcome.is_complete(),
            "Registration status loaded"
        );

        Ok(outcome)
    }

    /// Load an event the first time it is shown; later calls are no-ops
    pub async fn load_once(
        &self,
        store: &mut RegistrationStore,
        event_id: i64,
        cancel: &CancellationToken,
    ) -> Result<Option<LoadOutcome>> {
        if store.is_loaded(event_id) {
            debug!(event_id = event_id, "Registration status already loaded");
            return Ok(None);
        }
        self.load_status(store, event_id, cancel).await.map(Some)
    }

    /// Refetch status and capacity, replacing whatever was cached
    pub async fn refresh(
        &self,
        store: &mut RegistrationStore,
        event_id: i64,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let (status, spots) = cancellable(cancel, async {
            Ok(futures::join!(
                self.api.get_registration_status(event_id),
                self.api.get_available_spots(event_id),
            ))
        })
        .await?;

        let before = store.available_spots(event_id);
        let mut first_error = None;

        match status {
            Ok(status) => {
                store.dispatch(event_id, StoreAction::StatusFetched(status));
            }
            Err(e) => first_error = Some(e),
        }

        match spots {
            Ok(spots) => {
                store.dispatch(event_id, StoreAction::SpotsFetched(spots));
                log_capacity_change(event_id, before, Some(spots), "refetch");
            }
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Register without a form
    pub async fn register_simple(
        &self,
        store: &mut RegistrationStore,
        event_id: i64,
        cancel: &CancellationToken,
    ) -> Result<RegistrationRecord> {
        self.ensure_open(store, event_id)?;

        if let Some(form) = store.entry(event_id).and_then(|e| e.active_form.as_ref()) {
            debug!(event_id = event_id, form_id = ?form.id, "Plain registration refused, event has an active form");
            return Err(CampusLinkError::InvalidStateTransition {
                from: "form_pending".to_string(),
                to: "registered_simple".to_string(),
            });
        }

        let record = match cancellable(cancel, self.api.register_simple(event_id)).await {
            Ok(record) => record,
            Err(e) => return Err(self.on_failure(store, event_id, e, cancel).await),
        };

        self.apply(store, event_id, StoreAction::Registered(RegistrationHandle::Simple), "register_simple");
        self.reconcile(store, event_id, cancel).await;
        Ok(record)
    }

    /// Register by submitting the event's active form
    pub async fn register_with_form(
        &self,
        store: &mut RegistrationStore,
        event_id: i64,
        form_id: i64,
        responses: &ResponseMap,
        cancel: &CancellationToken,
    ) -> Result<SubmissionRecord> {
        self.ensure_open(store, event_id)?;
        let form = self.accepting_form(store, event_id, form_id)?;

        let errors = validate_fields(&form.fields, responses);
        if !errors.is_empty() {
            debug!(event_id = event_id, form_id = form_id, errors = errors.len(), "Registration form failed validation");
            return Err(CampusLinkError::Validation(errors));
        }

        let submission = cancellable(cancel, self.coordinator.submit(event_id, &form, responses, false)).await;
        let record = match submission {
            Ok(record) => record,
            Err(e) => return Err(self.on_failure(store, event_id, e, cancel).await),
        };

        self.apply(store, event_id, StoreAction::Registered(RegistrationHandle::FormBacked(form_id)), "register_with_form");
        self.reconcile(store, event_id, cancel).await;
        Ok(record)
    }

    /// Replace the answers of an existing registration
    pub async fn update_form_registration(
        &self,
        store: &mut RegistrationStore,
        event_id: i64,
        form_id: i64,
        responses: &ResponseMap,
        cancel: &CancellationToken,
    ) -> Result<SubmissionRecord> {
        let status = store.status(event_id);
        if !status.is_registered() {
            return Err(CampusLinkError::InvalidStateTransition {
                from: "none".to_string(),
                to: "update_submission".to_string(),
            });
        }

        let form = self.accepting_form(store, event_id, form_id)?;
        let errors = validate_fields(&form.fields, responses);
        if !errors.is_empty() {
            return Err(CampusLinkError::Validation(errors));
        }

        let submission = cancellable(cancel, self.coordinator.submit(event_id, &form, responses, true)).await;
        let record = match submission {
            Ok(record) => record,
            Err(e) => return Err(self.on_failure(store, event_id, e, cancel).await),
        };

        log_registration_action(event_id, "update_form_registration", Some(&format!("form {}", form_id)));
        Ok(record)
    }

    /// Fetch the caller's previous answers to pre-fill an edit
    pub async fn load_submission_for_edit(
        &self,
        store: &RegistrationStore,
        event_id: i64,
        cancel: &CancellationToken,
    ) -> Result<ResponseMap> {
        let form_id = match store.status(event_id) {
            RegistrationStatus::FormBacked(form_id) => form_id,
            other => {
                return Err(CampusLinkError::InvalidStateTransition {
                    from: other.to_string(),
                    to: "edit_submission".to_string(),
                })
            }
        };

        let record = cancellable(cancel, self.api.get_form_submission(event_id, form_id)).await?;

        let form = store
            .entry(event_id)
            .and_then(|e| e.active_form.clone())
            .filter(|f| f.id == Some(form_id))
            .unwrap_or_else(|| FormDefinition::draft(""));

        Ok(decode_responses(&form, &record.responses))
    }

    /// Cancel a registration through the path matching how it was made
    pub async fn unregister(
        &self,
        store: &mut RegistrationStore,
        event_id: i64,
        handle: RegistrationHandle,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let result = match handle {
            RegistrationHandle::Simple => cancellable(cancel, self.api.unregister_simple(event_id)).await,
            RegistrationHandle::FormBacked(form_id) => {
                cancellable(cancel, self.api.delete_form_submission(event_id, form_id)).await
            }
        };

        if let Err(e) = result {
            return Err(self.on_failure(store, event_id, e, cancel).await);
        }

        self.apply(store, event_id, StoreAction::Unregistered, "unregister");
        self.reconcile(store, event_id, cancel).await;
        Ok(())
    }

    fn ensure_open(&self, store: &RegistrationStore, event_id: i64) -> Result<()> {
        let Some(event) = store.entry(event_id).and_then(|e| e.event.as_ref()) else {
            return Ok(());
        };

        if !EventStatus::of(event, (self.clock)()).allows_registration() {
            return Err(CampusLinkError::RegistrationClosed {
                event_id,
                reason: "This event has already ended".to_string(),
            });
        }
        Ok(())
    }

    fn accepting_form(&self, store: &RegistrationStore, event_id: i64, form_id: i64) -> Result<FormDefinition> {
        let form = store
            .entry(event_id)
            .and_then(|e| e.active_form.as_ref())
            .filter(|f| f.id == Some(form_id))
            .cloned()
            .ok_or(CampusLinkError::FormNotFound { event_id, form_id })?;

        if !form.is_active {
            return Err(CampusLinkError::RegistrationClosed {
                event_id,
                reason: "The registration form is not active".to_string(),
            });
        }
        if !form.is_accepting_responses((self.clock)()) {
            return Err(CampusLinkError::RegistrationClosed {
                event_id,
                reason: "The registration deadline has passed".to_string(),
            });
        }
        Ok(form)
    }

    fn apply(&self, store: &mut RegistrationStore, event_id: i64, action: StoreAction, name: &str) {
        let before = store.available_spots(event_id);
        let entry = store.dispatch(event_id, action);
        let after = entry.capacity.available_spots;
        log_registration_action(event_id, name, Some(&entry.status.to_string()));
        log_capacity_change(event_id, before, after, "optimistic");
    }

    async fn reconcile(&self, store: &mut RegistrationStore, event_id: i64, cancel: &CancellationToken) {
        if !self.config.reconcile_after_mutation {
            return;
        }
        if let Err(e) = self.refresh(store, event_id, cancel).await {
            warn!(event_id = event_id, error = %e, "Refetch after registration change failed, keeping optimistic state");
        }
    }

    async fn on_failure(
        &self,
        store: &mut RegistrationStore,
        event_id: i64,
        error: CampusLinkError,
        cancel: &CancellationToken,
    ) -> CampusLinkError {
        if error.is_conflict() && self.config.refetch_on_conflict {
            info!(event_id = event_id, error = %error, "Registration conflict, refetching status and capacity");
            if let Err(e) = self.refresh(store, event_id, cancel).await {
                warn!(event_id = event_id, error = %e, "Refetch after conflict failed");
            }
        } else {
            warn!(event_id = event_id, error = %error, "Registration request failed");
        }
        error
    }
}
