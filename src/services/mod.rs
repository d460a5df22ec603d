//! Services module
//!
//! This module contains the event API client and the submission coordinator

pub mod api;
pub mod submission;

// Re-export commonly used services
pub use api::{EventApi, HttpEventApi};
pub use submission::{build_payload, SubmissionCoordinator, SubmissionMode};

use std::sync::Arc;
use crate::config::settings::Settings;
use crate::state::RegistrationStateMachine;
use crate::utils::errors::Result;

/// Service factory wiring the API client into the registration services
#[derive(Clone)]
pub struct ServiceFactory {
    pub api: Arc<dyn EventApi>,
    pub submissions: SubmissionCoordinator,
    pub registrations: RegistrationStateMachine,
}

impl ServiceFactory {
    /// Create a new ServiceFactory backed by the HTTP client
    pub fn new(settings: &Settings) -> Result<Self> {
        let api: Arc<dyn EventApi> = Arc::new(HttpEventApi::new(&settings.api)?);
        Ok(Self::with_api(api, settings))
    }

    /// Create a ServiceFactory over any [`EventApi`] implementation
    pub fn with_api(api: Arc<dyn EventApi>, settings: &Settings) -> Self {
        Self {
            submissions: SubmissionCoordinator::new(api.clone()),
            registrations: RegistrationStateMachine::new(api.clone(), settings.registration.clone()),
            api,
        }
    }
}
