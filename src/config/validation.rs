//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{CampusLinkError, Result};
use super::Settings;

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_api_config(&settings.api)?;
    validate_logging_config(&settings.logging)?;
    Ok(())
}

/// Validate event API configuration
fn validate_api_config(config: &super::ApiConfig) -> Result<()> {
    if config.base_url.is_empty() {
        return Err(CampusLinkError::Config(
            "API base URL is required".to_string()
        ));
    }

    let url = url::Url::parse(&config.base_url)
        .map_err(|e| CampusLinkError::Config(format!("Invalid API base URL '{}': {}", config.base_url, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CampusLinkError::Config(
            format!("API base URL must use http or https, got {}", url.scheme())
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(CampusLinkError::Config(
            "API timeout must be greater than 0".to_string()
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(CampusLinkError::Config(
            "User agent must not be empty".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(CampusLinkError::Config(
            "Log level is required".to_string()
        ));
    }

    // Directives like "campuslink=debug" are accepted as long as every level is known
    for directive in config.level.split(',') {
        let level = directive.rsplit('=').next().unwrap_or_default().trim();
        if !VALID_LEVELS.contains(&level.to_lowercase().as_str()) {
            return Err(CampusLinkError::Config(
                format!("Invalid log level: {}. Valid levels: {:?}", config.level, VALID_LEVELS)
            ));
        }
    }

    if let Some(path) = &config.file_path {
        if path.trim().is_empty() {
            return Err(CampusLinkError::Config(
                "Log file path must not be empty when set".to_string()
            ));
        }
    }

    Ok(())
}
