// SPDX-FileCopyrightText: 2026 Toolbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde attributes cannot express. All errors
//! are collected; validation does not stop at the first one.

use crate::diagnostic::{ConfigError, suggest_key};
use crate::model::ToolbridgeConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &ToolbridgeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.agent.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "agent.name must not be empty".to_string(),
        });
    }

    if config.agent.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "agent.model must not be empty".to_string(),
        });
    }

    let level = config.agent.log_level.as_str();
    if !LOG_LEVELS.contains(&level) {
        errors.push(ConfigError::InvalidValue {
            key: "agent.log_level".to_string(),
            value: level.to_string(),
            suggestion: suggest_key(level, LOG_LEVELS),
            allowed: LOG_LEVELS.join(", "),
        });
    }

    if let Some(url) = &config.agent.base_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        errors.push(ConfigError::Validation {
            message: format!("agent.base_url must start with http:// or https://, got `{url}`"),
        });
    }

    if let Err(e) = semver::Version::parse(&config.tools.default_version) {
        errors.push(ConfigError::Validation {
            message: format!(
                "tools.default_version `{}` is not a semantic version: {e}",
                config.tools.default_version
            ),
        });
    }

    if config.tools.default_author.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "tools.default_author must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
