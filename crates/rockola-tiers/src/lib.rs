// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tier registry for the Rockola jukebox bot.
//!
//! Maps each [`Tier`] to its immutable [`TierProfile`]: daily quota,
//! personal cooldown, queue priority rank, location requirements, and
//! capability set. The profile table is read-only at runtime except through
//! [`TierRegistry::set_profile`], which replaces a whole entry atomically so
//! a limit change can never be observed without its paired cooldown change.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::RwLock;
use tracing::info;

use rockola_core::{RockolaError, Tier};

/// Queue priority rank at and above which admitted tracks insert at the
/// front of the playlist instead of appending.
pub const VIP_RANK: u8 = 3;

/// A capability granted to a tier.
///
/// Capabilities are checked once, in the admission controller and the
/// notification scheduler -- never re-derived from the tier enum at call
/// sites.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString,
    Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    RequestSong,
    ViewQueue,
    ViewStats,
    SuggestArtist,
    /// May cancel their own queued track from a coming-up notification.
    /// VIP deliberately lacks this: a VIP track plays no matter what.
    CancelOwnRequest,
    ManageQueue,
    RemoveSong,
    /// Repeat-window violations become a warning instead of a denial.
    BypassRepeatWindow,
    ManageUsers,
    FullAccess,
}

/// Immutable per-tier configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierProfile {
    /// Maximum accepted requests per calendar day. `None` = unlimited.
    pub daily_limit: Option<u32>,
    /// Minutes a user must wait between their own accepted requests.
    /// For VIP this is the rolling-hour window measured from
    /// `last_vip_request_at` rather than the general request timestamp.
    pub cooldown_minutes: i64,
    /// Higher ranks insert closer to now-playing. See [`VIP_RANK`].
    pub priority_rank: u8,
    /// Whether the user must have shared a location at all.
    pub requires_location: bool,
    /// Whether the shared location must fall inside the plaza geofence.
    /// VIP requires location capture but skips geofence validation.
    pub enforces_geofence: bool,
    /// Capability set for this tier.
    pub capabilities: BTreeSet<Capability>,
}

impl TierProfile {
    /// Returns whether this profile grants a capability, directly or via
    /// [`Capability::FullAccess`].
    pub fn has(&self, cap: Capability) -> bool {
        self.capabilities.contains(&cap) || self.capabilities.contains(&Capability::FullAccess)
    }
}

/// Per-tier daily limits used to seed the default profile table.
///
/// Mirrors the configurable limits of the deployment environment; cooldowns,
/// ranks, and capabilities are fixed policy.
#[derive(Debug, Clone, Copy)]
pub struct DailyLimits {
    pub normal: u32,
    pub premium: u32,
    pub vip: u32,
}

impl Default for DailyLimits {
    fn default() -> Self {
        Self {
            normal: 3,
            premium: 3,
            vip: 1,
        }
    }
}

fn default_profiles(limits: DailyLimits) -> HashMap<Tier, TierProfile> {
    use Capability::*;

    let mut table = HashMap::new();

    table.insert(
        Tier::Normal,
        TierProfile {
            daily_limit: Some(limits.normal),
            cooldown_minutes: 60,
            priority_rank: 1,
            requires_location: true,
            enforces_geofence: true,
            capabilities: BTreeSet::from([RequestSong, CancelOwnRequest]),
        },
    );

    table.insert(
        Tier::Premium,
        TierProfile {
            daily_limit: Some(limits.premium),
            cooldown_minutes: 30,
            priority_rank: 2,
            requires_location: true,
            enforces_geofence: true,
            capabilities: BTreeSet::from([RequestSong, ViewQueue, SuggestArtist, CancelOwnRequest]),
        },
    );

    // VIP must share a location but is never geofence-validated, and its
    // requests cannot be cancelled once queued.
    table.insert(
        Tier::Vip,
        TierProfile {
            daily_limit: Some(limits.vip),
            cooldown_minutes: 60,
            priority_rank: 3,
            requires_location: true,
            enforces_geofence: false,
            capabilities: BTreeSet::from([RequestSong, ViewQueue, ViewStats, SuggestArtist]),
        },
    );

    table.insert(
        Tier::Technician,
        TierProfile {
            daily_limit: None,
            cooldown_minutes: 0,
            priority_rank: 4,
            requires_location: true,
            enforces_geofence: true,
            capabilities: BTreeSet::from([
                RequestSong,
                ViewQueue,
                ViewStats,
                SuggestArtist,
                CancelOwnRequest,
                ManageQueue,
                RemoveSong,
                BypassRepeatWindow,
            ]),
        },
    );

    table.insert(
        Tier::Administrator,
        TierProfile {
            daily_limit: None,
            cooldown_minutes: 0,
            priority_rank: 5,
            requires_location: false,
            enforces_geofence: false,
            capabilities: BTreeSet::from([BypassRepeatWindow, FullAccess]),
        },
    );

    table
}

/// The tier profile table.
///
/// Constructed once at startup and injected wherever tier policy is needed.
/// Lookups fail loudly for a tier with no entry: the registry never
/// silently falls back to a default beyond initial account creation.
pub struct TierRegistry {
    profiles: RwLock<HashMap<Tier, TierProfile>>,
}

impl TierRegistry {
    /// Builds a registry with the default profile table.
    pub fn new(limits: DailyLimits) -> Self {
        Self {
            profiles: RwLock::new(default_profiles(limits)),
        }
    }

    /// Returns the profile for a tier.
    pub async fn profile_for(&self, tier: Tier) -> Result<TierProfile, RockolaError> {
        self.profiles
            .read()
            .await
            .get(&tier)
            .cloned()
            .ok_or_else(|| RockolaError::UnknownTier {
                tier: tier.to_string(),
            })
    }

    /// Replaces a tier's whole profile entry.
    ///
    /// The sole mutation path, used by administrative configuration. Whole-
    /// entry replacement keeps the limit and its paired cooldown consistent;
    /// there are no partial-field updates.
    pub async fn set_profile(&self, tier: Tier, profile: TierProfile) {
        self.profiles.write().await.insert(tier, profile.clone());
        info!(
            tier = %tier,
            daily_limit = ?profile.daily_limit,
            cooldown_minutes = profile.cooldown_minutes,
            priority_rank = profile.priority_rank,
            "tier profile replaced"
        );
    }

    /// Returns a snapshot of the whole table, for the admin panel.
    pub async fn all(&self) -> HashMap<Tier, TierProfile> {
        self.profiles.read().await.clone()
    }
}

impl Default for TierRegistry {
    fn default() -> Self {
        Self::new(DailyLimits::default())
    }
}
