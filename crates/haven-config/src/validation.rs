// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as URL schemes, non-zero deadlines, and known log levels.

use crate::diagnostic::ConfigError;
use crate::model::HavenConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &HavenConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.app.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level `{}` is not one of {}",
                config.app.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if let Some(user) = &config.app.user_id
        && user.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "app.user_id must not be blank when set".to_string(),
        });
    }

    if let Some(url) = &config.primary.url {
        check_url("primary.url", url, &mut errors);
    }
    if let Some(url) = &config.secondary.base_url {
        check_url("secondary.base_url", url, &mut errors);
    }

    if let Some(token) = &config.primary.auth_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "primary.auth_token must not be blank when set".to_string(),
        });
    }

    for (name, value) in [
        ("primary.timeout_ms", config.primary.timeout_ms),
        ("primary.subscription_poll_ms", config.primary.subscription_poll_ms),
        ("secondary.timeout_ms", config.secondary.timeout_ms),
        ("cache.timeout_ms", config.cache.timeout_ms),
    ] {
        if value == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{name} must be greater than zero"),
            });
        }
    }

    if config.cache.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "cache.database_path must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(name: &str, url: &str, errors: &mut Vec<ConfigError>) {
    let trimmed = url.trim();
    let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    let has_host = trimmed
        .split_once("://")
        .map(|(_, rest)| !rest.is_empty())
        .unwrap_or(false);
    if !has_scheme || !has_host {
        errors.push(ConfigError::Validation {
            message: format!("{name} `{url}` must be an http(s) URL with a host"),
        });
    }
}
