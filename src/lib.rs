//! CampusLink event registration core
//!
//! Client-side registration for a student networking platform: loading an
//! event's registration status and capacity, plain and form-backed
//! registration, dynamic registration forms with per-field validation, and
//! cancellation through whichever path the registration was made.

#![allow(non_snake_case)]

pub mod config;
pub mod forms;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{CampusLinkError, Result};

// Re-export main components for easy access
pub use forms::{FormStepController, ValidationErrors};
pub use services::{EventApi, HttpEventApi, ServiceFactory};
pub use state::{RegistrationStateMachine, RegistrationStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
