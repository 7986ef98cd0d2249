// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths, positive intervals, and Redis URL schemes.

use crate::diagnostic::ConfigError;
use crate::model::{BackendStrategy, ConvoConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ConvoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.log.level.trim().to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` must be one of: {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    // The SQLite section is only checked when it is the selected backend.
    if config.store.backend == BackendStrategy::Sqlite {
        if config.sqlite.database_path.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "sqlite.database_path must not be empty".to_string(),
            });
        }

        if config.sqlite.cleanup.interval_secs == 0 {
            errors.push(ConfigError::Validation {
                message: "sqlite.cleanup.interval_secs must be at least 1".to_string(),
            });
        }

        if config.sqlite.cleanup.batch_size == 0 {
            errors.push(ConfigError::Validation {
                message: "sqlite.cleanup.batch_size must be at least 1".to_string(),
            });
        }
    }

    if config.key_value.key_prefix.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "key_value.key_prefix must not be empty".to_string(),
        });
    }

    if config.key_value.key_prefix.contains(':') {
        errors.push(ConfigError::Validation {
            message: format!(
                "key_value.key_prefix `{}` must not contain `:`",
                config.key_value.key_prefix
            ),
        });
    }

    if let Some(url) = &config.key_value.url {
        if !(url.starts_with("redis://") || url.starts_with("rediss://")) {
            errors.push(ConfigError::Validation {
                message: format!("key_value.url `{url}` must start with redis:// or rediss://"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
