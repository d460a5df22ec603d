//! Error handling for CampusLink
//!
//! This module defines the main error types used throughout the registration core
//! and provides a unified error handling strategy.

use thiserror::Error;
use crate::forms::validator::ValidationErrors;

/// Banner text used when the server gives no usable message
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Main error type for the CampusLink registration core
#[derive(Error, Debug)]
pub enum CampusLinkError {
    #[error("Event API error: {0}")]
    Api(#[from] ApiError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Form not found: {form_id} (event {event_id})")]
    FormNotFound { event_id: i64, form_id: i64 },

    #[error("Registration closed for event {event_id}: {reason}")]
    RegistrationClosed { event_id: i64, reason: String },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Non-success response from the event API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("HTTP {status}: {message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    /// Whether `message` came from the response body rather than a fallback
    pub from_server: bool,
}

/// Result type alias for CampusLink operations
pub type Result<T> = std::result::Result<T, CampusLinkError>;

impl ApiError {
    /// Build an error from a status code, an optional server message and a fallback text
    pub fn new(status: u16, server_message: Option<String>, fallback: &str) -> Self {
        match server_message {
            Some(message) => Self { status, message, from_server: true },
            None => Self { status, message: fallback.to_string(), from_server: false },
        }
    }

    /// Capacity and conflict errors: event full, already registered, deadline passed
    pub fn is_conflict(&self) -> bool {
        if self.status == 409 || self.status == 410 {
            return true;
        }

        if !self.from_server {
            return false;
        }

        let message = self.message.to_lowercase();
        ["full", "already registered", "deadline", "no spots", "capacity"]
            .iter()
            .any(|needle| message.contains(needle))
    }
}

impl CampusLinkError {
    /// Check if re-invoking the triggering action may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            CampusLinkError::Api(e) => e.status >= 500 || e.is_conflict() || e.status == 429,
            CampusLinkError::Http(_) => true,
            CampusLinkError::Serialization(_) => false,
            CampusLinkError::UrlParse(_) => false,
            CampusLinkError::Validation(_) => true,
            CampusLinkError::Config(_) => false,
            CampusLinkError::EventNotFound { .. } => false,
            CampusLinkError::FormNotFound { .. } => false,
            CampusLinkError::RegistrationClosed { .. } => false,
            CampusLinkError::InvalidStateTransition { .. } => false,
            CampusLinkError::InvalidInput(_) => false,
            CampusLinkError::Cancelled => true,
        }
    }

    /// Whether the error means local state disagrees with the server
    pub fn is_conflict(&self) -> bool {
        matches!(self, CampusLinkError::Api(e) if e.is_conflict())
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CampusLinkError::Config(_) => ErrorSeverity::Critical,
            CampusLinkError::UrlParse(_) => ErrorSeverity::Critical,
            CampusLinkError::Validation(_) => ErrorSeverity::Info,
            CampusLinkError::Cancelled => ErrorSeverity::Info,
            CampusLinkError::InvalidInput(_) => ErrorSeverity::Info,
            CampusLinkError::RegistrationClosed { .. } => ErrorSeverity::Warning,
            CampusLinkError::Api(e) if e.is_conflict() => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Text for a dismissible error banner
    pub fn user_message(&self) -> String {
        match self {
            CampusLinkError::Api(e) => e.message.clone(),
            CampusLinkError::Validation(errors) => match errors.first_message() {
                Some(message) => message.to_string(),
                None => "Please correct the highlighted fields".to_string(),
            },
            CampusLinkError::RegistrationClosed { reason, .. } => reason.clone(),
            CampusLinkError::EventNotFound { .. } => "This event no longer exists".to_string(),
            CampusLinkError::FormNotFound { .. } => "This registration form is no longer available".to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
