// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Rockola jukebox bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Rockola configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RockolaConfig {
    /// Bot identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Plaza location, geofence, and timezone settings.
    #[serde(default)]
    pub plaza: PlazaConfig,

    /// Per-tier daily request limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Background timer intervals.
    #[serde(default)]
    pub timers: TimerConfig,

    /// Anti-flood and rate-limit settings.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Persistence settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway (webhook bridge + admin panel) settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Catalog/playback backend settings.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Outbound messaging transport settings.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Content filter word lists.
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Bot identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "rockola".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Plaza location, geofence radius, and local timezone.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlazaConfig {
    /// Geofence center latitude, decimal degrees.
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    /// Geofence center longitude, decimal degrees.
    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// Geofence radius in kilometers.
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,

    /// Plaza-local UTC offset in minutes, used for the calendar-day quota
    /// reset. Negative values are west of UTC.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
}

impl Default for PlazaConfig {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            radius_km: default_radius_km(),
            utc_offset_minutes: default_utc_offset(),
        }
    }
}

fn default_latitude() -> f64 {
    25.42
}

fn default_longitude() -> f64 {
    -101.0
}

fn default_radius_km() -> f64 {
    0.2
}

fn default_utc_offset() -> i32 {
    -360 // UTC-6
}

/// Per-tier daily request limits. Technician and Administrator are
/// unlimited and not configurable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    #[serde(default = "default_normal_daily")]
    pub normal_daily: u32,

    #[serde(default = "default_premium_daily")]
    pub premium_daily: u32,

    #[serde(default = "default_vip_daily")]
    pub vip_daily: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            normal_daily: default_normal_daily(),
            premium_daily: default_premium_daily(),
            vip_daily: default_vip_daily(),
        }
    }
}

fn default_normal_daily() -> u32 {
    3
}

fn default_premium_daily() -> u32 {
    3
}

fn default_vip_daily() -> u32 {
    1
}

/// Background timer intervals, in seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TimerConfig {
    /// Notification scheduler polling interval.
    #[serde(default = "default_notify_poll_secs")]
    pub notify_poll_secs: u64,

    /// Repetition ledger prune interval.
    #[serde(default = "default_ledger_prune_secs")]
    pub ledger_prune_secs: u64,

    /// Pending-notification sweep interval.
    #[serde(default = "default_notification_sweep_secs")]
    pub notification_sweep_secs: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            notify_poll_secs: default_notify_poll_secs(),
            ledger_prune_secs: default_ledger_prune_secs(),
            notification_sweep_secs: default_notification_sweep_secs(),
        }
    }
}

fn default_notify_poll_secs() -> u64 {
    30
}

fn default_ledger_prune_secs() -> u64 {
    30 * 60
}

fn default_notification_sweep_secs() -> u64 {
    5 * 60
}

/// Anti-flood and rate-limit settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: usize,

    #[serde(default = "default_flood_threshold")]
    pub flood_threshold: usize,

    #[serde(default = "default_flood_window_secs")]
    pub flood_window_secs: i64,

    #[serde(default = "default_temp_block_minutes")]
    pub temp_block_minutes: i64,

    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            rate_limit_per_minute: default_rate_limit(),
            flood_threshold: default_flood_threshold(),
            flood_window_secs: default_flood_window_secs(),
            temp_block_minutes: default_temp_block_minutes(),
            max_message_len: default_max_message_len(),
        }
    }
}

fn default_rate_limit() -> usize {
    20
}

fn default_flood_threshold() -> usize {
    5
}

fn default_flood_window_secs() -> i64 {
    10
}

fn default_temp_block_minutes() -> i64 {
    60
}

fn default_max_message_len() -> usize {
    500
}

/// Persistence settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory where JSON documents are stored.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Accounts idle longer than this many days are removed by the
    /// retention sweep.
    #[serde(default = "default_retention_days")]
    pub retention_max_idle_days: i64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            retention_max_idle_days: default_retention_days(),
        }
    }
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_retention_days() -> i64 {
    90
}

/// HTTP gateway settings: the inbound webhook bridge and the admin panel.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_enabled")]
    pub enabled: bool,

    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token for the admin routes. Required when the gateway is
    /// enabled: there is no unauthenticated admin access (fail-closed).
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: default_gateway_enabled(),
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: None,
        }
    }
}

fn default_gateway_enabled() -> bool {
    true
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8321
}

/// Catalog/playback backend settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Base URL of the playback backend's HTTP API.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Outbound messaging transport settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// URL that proactive outbound messages are POSTed to.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Content filter word lists.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Words that trigger a warning rejection.
    #[serde(default)]
    pub warn_words: Vec<String>,

    /// Words that trigger a blocking rejection.
    #[serde(default)]
    pub block_words: Vec<String>,
}
