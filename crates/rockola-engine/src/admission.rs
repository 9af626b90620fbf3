// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admission controller: the per-request admit/deny decision.
//!
//! [`evaluate`] combines the blocklist status, content-filter verdict,
//! location/geofence checks, daily quota, personal tier cooldown, same-day
//! duplicate check, and the global repeat window into a single verdict.
//! It is a pure function of its inputs -- no I/O, no clocks, no mutation.
//! The caller gathers the async pieces (blocklist lookup, filter verdict,
//! ledger status) up front and applies whatever the verdict reports (for
//! content rejections, the filter's recommended account action).
//!
//! The check order is policy, not convenience: block and content checks run
//! before quota checks so a blocked user never learns their quota status.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use rockola_core::types::{FilterAction, FilterVerdict, GeoPoint, Severity};
use rockola_core::{GeofenceCheck, Tier, TrackId};
use rockola_tiers::{Capability, TierProfile};

use crate::accounts::UserAccount;
use crate::ledger::CooldownStatus;

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenyReason {
    PermanentlyBlocked,
    ContentRejected {
        severity: Severity,
        action: FilterAction,
    },
    LocationRequired,
    GeofenceRejected,
    QuotaExceeded {
        limit: u32,
    },
    TierCooldownActive {
        minutes_remaining: i64,
    },
    DuplicateToday,
    CooldownActive {
        minutes_remaining: i64,
    },
}

/// The admission decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Verdict {
    Admit,
    /// Privileged repeat: the request is admitted, the play is still
    /// recorded, and the requester is told how recently the track played.
    AdmitWithWarning { minutes_elapsed: i64 },
    Deny(DenyReason),
}

impl Verdict {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Verdict::Admit | Verdict::AdmitWithWarning { .. })
    }
}

/// Everything the decision needs, gathered by the caller.
pub struct AdmissionInput<'a> {
    pub user: &'a UserAccount,
    pub profile: &'a TierProfile,
    pub track: &'a TrackId,
    /// Content-filter verdict on the raw request text.
    pub filter: &'a FilterVerdict,
    /// Blocklist lookup result.
    pub blocked: bool,
    /// Repeat-window status for the candidate track.
    pub repeat: CooldownStatus,
    /// Plaza geofence parameters.
    pub plaza_center: GeoPoint,
    pub plaza_radius_km: f64,
    pub now: DateTime<Utc>,
}

/// Evaluates a song request. First failing check wins; see module docs for
/// why the order is fixed.
pub fn evaluate(input: &AdmissionInput<'_>, geofence: &dyn GeofenceCheck) -> Verdict {
    // 1. Permanent block: terminal, nothing else is revealed.
    if input.blocked {
        return Verdict::Deny(DenyReason::PermanentlyBlocked);
    }

    // 2. Content filter on the raw request text. The recommended action is
    //    reported for the dispatcher to apply; nothing is mutated here.
    if !input.filter.allowed {
        return Verdict::Deny(DenyReason::ContentRejected {
            severity: input.filter.severity,
            action: input.filter.recommended_action,
        });
    }

    // 3. Location capture.
    if input.profile.requires_location && !input.user.location_verified {
        return Verdict::Deny(DenyReason::LocationRequired);
    }

    // 4. Geofence validation. VIP profiles require location capture but set
    //    `enforces_geofence = false`, so they skip this check entirely.
    if input.profile.enforces_geofence {
        let inside = input
            .user
            .last_known_location
            .map(|point| geofence.is_within(input.plaza_center, input.plaza_radius_km, point))
            .unwrap_or(false);
        if !inside {
            return Verdict::Deny(DenyReason::GeofenceRejected);
        }
    }

    // 5. Daily quota. The caller's account store already reset the counter
    //    if the plaza calendar day changed.
    if let Some(limit) = input.profile.daily_limit {
        if input.user.daily_request_count >= limit {
            return Verdict::Deny(DenyReason::QuotaExceeded { limit });
        }
    }

    // 6. Personal tier cooldown. VIP is exactly one request per rolling
    //    hour from its dedicated timestamp; other tiers measure from their
    //    last accepted request.
    if let Some(minutes_remaining) = tier_cooldown_remaining(input) {
        return Verdict::Deny(DenyReason::TierCooldownActive { minutes_remaining });
    }

    // 7. Same-day duplicate.
    if input.user.requests_today.contains(input.track) {
        return Verdict::Deny(DenyReason::DuplicateToday);
    }

    // 8. Global repeat window. Privileged tiers pass with a warning; the
    //    play is still recorded downstream so they know they are repeating.
    if input.repeat.in_cooldown {
        if input.profile.has(Capability::BypassRepeatWindow) {
            return Verdict::AdmitWithWarning {
                minutes_elapsed: input.repeat.minutes_elapsed,
            };
        }
        return Verdict::Deny(DenyReason::CooldownActive {
            minutes_remaining: input.repeat.minutes_remaining,
        });
    }

    Verdict::Admit
}

fn tier_cooldown_remaining(input: &AdmissionInput<'_>) -> Option<i64> {
    if input.profile.cooldown_minutes <= 0 {
        return None;
    }

    let reference = if input.user.tier == Tier::Vip {
        input.user.last_vip_request_at
    } else {
        input.user.last_request_at
    }?;

    let window = Duration::minutes(input.profile.cooldown_minutes);
    let elapsed = input.now - reference;
    if elapsed < window {
        let remaining_ms = (window - elapsed).num_milliseconds();
        Some((remaining_ms as u64).div_ceil(60_000) as i64)
    } else {
        None
    }
}
