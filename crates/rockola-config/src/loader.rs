// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./rockola.toml` > `~/.config/rockola/rockola.toml` > `/etc/rockola/rockola.toml`
//! with environment variable overrides via `ROCKOLA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RockolaConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/rockola/rockola.toml` (system-wide)
/// 3. `~/.config/rockola/rockola.toml` (user XDG config)
/// 4. `./rockola.toml` (local directory)
/// 5. `ROCKOLA_*` environment variables
pub fn load_config() -> Result<RockolaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RockolaConfig::default()))
        .merge(Toml::file("/etc/rockola/rockola.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("rockola/rockola.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("rockola.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<RockolaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RockolaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RockolaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RockolaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `ROCKOLA_GATEWAY_BEARER_TOKEN` must map
/// to `gateway.bearer_token`, not `gateway.bearer.token`.
fn env_provider() -> Env {
    Env::prefixed("ROCKOLA_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: ROCKOLA_GATEWAY_BEARER_TOKEN -> "gateway_bearer_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("plaza_", "plaza.", 1)
            .replacen("limits_", "limits.", 1)
            .replacen("timers_", "timers.", 1)
            .replacen("security_", "security.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("catalog_", "catalog.", 1)
            .replacen("transport_", "transport.", 1)
            .replacen("filter_", "filter.", 1);
        mapped.into()
    })
}
