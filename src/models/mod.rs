//! Data models module
//!
//! This module contains the data structures exchanged with the event API

pub mod event;
pub mod form;
pub mod registration;
pub mod timestamp;

// Re-export commonly used models
pub use event::EventDefinition;
pub use form::{FieldDefinition, FieldType, FieldValue, FormDefinition, ResponseMap};
pub use registration::{
    AvailableSpotsResponse, CapacitySnapshot, FieldResponse, RegistrationHandle, RegistrationRecord,
    RegistrationStatus, RegistrationStatusResponse, SubmissionPayload, SubmissionRecord,
};
