//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use crate::utils::errors::{CampusLinkError, Result};

/// Format an event timestamp for display
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

/// Format an event window, dropping the repeated date for same-day events
pub fn format_event_window(start: NaiveDateTime, end: NaiveDateTime) -> String {
    if start.date() == end.date() {
        format!("{} - {}", format_timestamp(start), end.format("%H:%M"))
    } else {
        format!("{} - {}", format_timestamp(start), format_timestamp(end))
    }
}

/// Truncate text to a maximum length with ellipsis
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse `field_id=value` answers; later entries for the same field win
pub fn parse_answers<S: AsRef<str>>(entries: &[S]) -> Result<HashMap<i64, String>> {
    let mut answers = HashMap::new();

    for entry in entries {
        let entry = entry.as_ref();
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| CampusLinkError::InvalidInput(format!("Expected field_id=value, got '{}'", entry)))?;
        let field_id = key
            .trim()
            .parse::<i64>()
            .map_err(|_| CampusLinkError::InvalidInput(format!("Invalid field id '{}'", key.trim())))?;
        answers.insert(field_id, value.to_string());
    }

    Ok(answers)
}
