// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Rockola workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a subscriber (phone-like opaque string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a track in the catalog backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(pub String);

impl TrackId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an artist in the catalog backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtistId(pub String);

/// Unique identifier for a sent message, assigned by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// User's service level, determining quota, cooldown, and queue priority.
///
/// This is the single authoritative tier enum. Every tier-dependent decision
/// resolves through the tier registry; call sites never special-case tiers
/// beyond what their profile's capability set expresses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString,
    Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Normal,
    Premium,
    Vip,
    Technician,
    Administrator,
}

impl Tier {
    /// All tiers, in ascending priority order.
    pub const ALL: [Tier; 5] = [
        Tier::Normal,
        Tier::Premium,
        Tier::Vip,
        Tier::Technician,
        Tier::Administrator,
    ];
}

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// A track as returned by the catalog backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub artists: Vec<String>,
    pub duration_ms: u64,
}

impl Track {
    /// Comma-joined artist names for display in replies.
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}

/// An artist as returned by the catalog backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
}

/// Where a newly admitted track is inserted into the shared playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueuePosition {
    /// Immediately after whatever is currently playing.
    Front,
    /// At the tail of the playlist.
    Append,
}

/// Content of an inbound message: plain text or a shared location.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Location(GeoPoint),
}

/// An inbound message received from the transport.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub sender: UserId,
    pub content: MessageContent,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Severity of a content-filter match, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString,
    Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Action the content filter recommends the caller apply to the account.
///
/// The admission controller only reports this; applying it (warning the
/// user, temp-blocking, perma-blocking) is the dispatcher's job.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString,
    Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FilterAction {
    Warn,
    TempBlock,
    PermaBlock,
}

/// Outcome of evaluating request text against the content filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterVerdict {
    pub allowed: bool,
    pub categories: Vec<String>,
    pub severity: Severity,
    pub recommended_action: FilterAction,
}

impl FilterVerdict {
    /// A verdict that allows the text through unconditionally.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            categories: Vec::new(),
            severity: Severity::Low,
            recommended_action: FilterAction::Warn,
        }
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter in the registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Transport,
    Catalog,
    ContentFilter,
    Blocklist,
    Store,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn tier_display_and_parse_round_trip() {
        for tier in Tier::ALL {
            let s = tier.to_string();
            let parsed = Tier::from_str(&s).expect("should parse back");
            assert_eq!(tier, parsed, "round trip failed for {s}");
        }
    }

    #[test]
    fn tier_serde_uses_lowercase() {
        let json = serde_json::to_string(&Tier::Technician).unwrap();
        assert_eq!(json, "\"technician\"");
        let parsed: Tier = serde_json::from_str("\"vip\"").unwrap();
        assert_eq!(parsed, Tier::Vip);
    }

    #[test]
    fn severity_is_ordered() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn filter_action_escalates() {
        assert!(FilterAction::Warn < FilterAction::TempBlock);
        assert!(FilterAction::TempBlock < FilterAction::PermaBlock);
    }

    #[test]
    fn track_artist_line_joins_names() {
        let track = Track {
            id: TrackId("t1".into()),
            name: "Cumbia del Sol".into(),
            artists: vec!["Los Andes".into(), "La Banda".into()],
            duration_ms: 180_000,
        };
        assert_eq!(track.artist_line(), "Los Andes, La Banda");
    }

    #[test]
    fn allow_verdict_is_allowed() {
        let v = FilterVerdict::allow();
        assert!(v.allowed);
        assert!(v.categories.is_empty());
    }
}
