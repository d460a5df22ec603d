//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the CampusLink client.

use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use crate::config::LoggingConfig;
use crate::utils::errors::{CampusLinkError, Result};

/// Initialize logging based on configuration
///
/// Console output goes to stderr so command output on stdout stays clean.
/// When a file path is configured, a daily rolling file is written as well;
/// the returned guard must be held for as long as that file should receive
/// events.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| CampusLinkError::Config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let (file_writer, guard) = match &config.file_path {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "campuslink.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (Some(non_blocking), Some(guard))
        }
        None => (None, None),
    };

    let json_layer = config
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!config.json).then(|| fmt::layer().with_writer(std::io::stderr));
    let file_layer = file_writer.map(|writer| fmt::layer().with_ansi(false).with_writer(writer));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CampusLinkError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log registration actions with structured data
pub fn log_registration_action(event_id: i64, action: &str, details: Option<&str>) {
    info!(
        event_id = event_id,
        action = action,
        details = details,
        "Registration action performed"
    );
}

/// Log a change to the cached spot count
pub fn log_capacity_change(event_id: i64, before: Option<i64>, after: Option<i64>, reason: &str) {
    if before == after {
        return;
    }
    debug!(
        event_id = event_id,
        before = before,
        after = after,
        reason = reason,
        "Available spots changed"
    );
}

/// Log API errors with context
pub fn log_api_error(api: &str, error: &str, context: Option<&str>) {
    error!(
        api = api,
        error = error,
        context = context,
        "API error occurred"
    );
}
