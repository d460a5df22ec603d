//! State management module
//!
//! This module holds the registration lifecycle, the per-event cache and
//! capacity bookkeeping

pub mod capacity;
pub mod machine;
pub mod store;

// Re-export commonly used state components
pub use capacity::{display_spots, EventStatus, SpotsDisplay};
pub use machine::{LoadOutcome, RegistrationStateMachine};
pub use store::{reduce, EventEntry, RegistrationPhase, RegistrationStore, StoreAction};
