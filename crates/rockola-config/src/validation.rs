// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes: coordinate ranges, positive radii and intervals, and the
//! gateway's fail-closed auth requirement.

use crate::diagnostic::ConfigError;
use crate::model::RockolaConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RockolaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !(-90.0..=90.0).contains(&config.plaza.latitude) {
        errors.push(ConfigError::Validation {
            message: format!(
                "plaza.latitude must be between -90 and 90, got {}",
                config.plaza.latitude
            ),
        });
    }

    if !(-180.0..=180.0).contains(&config.plaza.longitude) {
        errors.push(ConfigError::Validation {
            message: format!(
                "plaza.longitude must be between -180 and 180, got {}",
                config.plaza.longitude
            ),
        });
    }

    if config.plaza.radius_km <= 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "plaza.radius_km must be positive, got {}",
                config.plaza.radius_km
            ),
        });
    }

    // 14 hours either way covers every real-world offset.
    if !(-840..=840).contains(&config.plaza.utc_offset_minutes) {
        errors.push(ConfigError::Validation {
            message: format!(
                "plaza.utc_offset_minutes must be between -840 and 840, got {}",
                config.plaza.utc_offset_minutes
            ),
        });
    }

    for (key, value) in [
        ("timers.notify_poll_secs", config.timers.notify_poll_secs),
        ("timers.ledger_prune_secs", config.timers.ledger_prune_secs),
        (
            "timers.notification_sweep_secs",
            config.timers.notification_sweep_secs,
        ),
    ] {
        if value == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be positive"),
            });
        }
    }

    if config.storage.data_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.data_dir must not be empty".to_string(),
        });
    }

    if config.storage.retention_max_idle_days <= 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "storage.retention_max_idle_days must be positive, got {}",
                config.storage.retention_max_idle_days
            ),
        });
    }

    // Fail-closed: an enabled gateway without auth would expose the admin
    // panel to anyone who can reach the port.
    if config.gateway.enabled && config.gateway.bearer_token.is_none() {
        errors.push(ConfigError::Validation {
            message: "gateway enabled but no authentication configured; set gateway.bearer_token"
                .to_string(),
        });
    }

    if config.security.rate_limit_per_minute == 0 {
        errors.push(ConfigError::Validation {
            message: "security.rate_limit_per_minute must be positive".to_string(),
        });
    }

    if config.security.flood_threshold == 0 {
        errors.push(ConfigError::Validation {
            message: "security.flood_threshold must be positive".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
