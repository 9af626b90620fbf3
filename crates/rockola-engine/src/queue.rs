// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue priority engine: playlist insertion for admitted requests.
//!
//! Tiers at or above [`VIP_RANK`] insert at the front of the playlist
//! (immediately after whatever is playing); everyone else appends. Within a
//! rank, arrival order is preserved -- the engine never reorders tracks
//! that are already queued.
//!
//! The external enqueue call happens FIRST; local state (account counters,
//! repetition ledger) is only mutated after it succeeds. If the catalog
//! call fails, no local mutation is applied and the failure surfaces as an
//! operational error, distinct from a policy denial.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

use rockola_core::types::{FilterVerdict, GeoPoint, QueuePosition, Track};
use rockola_core::{Catalog, GeofenceCheck, RockolaError, Tier};
use rockola_tiers::{TierProfile, VIP_RANK};

use crate::accounts::{AccountStore, UserAccount};
use crate::admission::{self, AdmissionInput, DenyReason, Verdict};
use crate::ledger::RepetitionLedger;

/// Estimated time until an inserted track plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eta {
    pub minutes: u64,
    pub seconds: u64,
}

impl Eta {
    fn from_ms(total_ms: u64) -> Self {
        Self {
            minutes: total_ms / 60_000,
            seconds: (total_ms % 60_000) / 1000,
        }
    }
}

/// A successfully enqueued request.
#[derive(Debug, Clone, PartialEq)]
pub struct EnqueueResult {
    pub position: QueuePosition,
    /// `None` when the playlist snapshot was unavailable after insertion.
    pub eta: Option<Eta>,
}

/// Outcome of running a request through admission and enqueue.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    Accepted {
        result: EnqueueResult,
        /// Minutes since the track last played, for privileged repeats.
        warning: Option<i64>,
    },
    Denied(DenyReason),
}

/// Geofence parameters, carried by the engine so admission stays pure.
#[derive(Debug, Clone, Copy)]
pub struct PlazaBounds {
    pub center: GeoPoint,
    pub radius_km: f64,
}

/// Decides playlist position, drives the external enqueue, and applies the
/// post-success local mutations.
pub struct QueuePriorityEngine {
    catalog: Arc<dyn Catalog>,
    ledger: Arc<RepetitionLedger>,
    accounts: Arc<AccountStore>,
    plaza: PlazaBounds,
    geofence: Arc<dyn GeofenceCheck>,
    /// Requests currently between admission and enqueue completion, by tier.
    in_flight: Mutex<HashMap<Tier, usize>>,
}

impl QueuePriorityEngine {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        ledger: Arc<RepetitionLedger>,
        accounts: Arc<AccountStore>,
        plaza: PlazaBounds,
        geofence: Arc<dyn GeofenceCheck>,
    ) -> Self {
        Self {
            catalog,
            ledger,
            accounts,
            plaza,
            geofence,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Runs admission for a candidate track and, on admit, enqueues it.
    ///
    /// On success the account counters are bumped, the same-day set gains
    /// the track, the tier-appropriate last-request timestamp is stamped,
    /// and the play is recorded in the repetition ledger (also for
    /// privileged bypass, so the repeat is auditable). On catalog failure
    /// none of that happens and the error propagates.
    pub async fn admit_and_enqueue(
        &self,
        user: &UserAccount,
        profile: &TierProfile,
        track: &Track,
        filter: &FilterVerdict,
        blocked: bool,
        now: DateTime<Utc>,
    ) -> Result<RequestOutcome, RockolaError> {
        let repeat = self.ledger.check_cooldown(&track.id, now).await;

        let verdict = admission::evaluate(
            &AdmissionInput {
                user,
                profile,
                track: &track.id,
                filter,
                blocked,
                repeat,
                plaza_center: self.plaza.center,
                plaza_radius_km: self.plaza.radius_km,
                now,
            },
            self.geofence.as_ref(),
        );

        let warning = match verdict {
            Verdict::Deny(reason) => return Ok(RequestOutcome::Denied(reason)),
            Verdict::Admit => None,
            Verdict::AdmitWithWarning { minutes_elapsed } => Some(minutes_elapsed),
        };

        let position = if profile.priority_rank >= VIP_RANK {
            QueuePosition::Front
        } else {
            QueuePosition::Append
        };

        self.track_in_flight(user.tier, 1).await;
        let enqueue_outcome = self.catalog.enqueue(&track.id, position).await;
        self.track_in_flight(user.tier, -1).await;

        if let Err(e) = enqueue_outcome {
            warn!(
                user = %user.id,
                track = %track.id,
                error = %e,
                "external enqueue failed; no local state was mutated"
            );
            return Err(e);
        }

        // The external call succeeded; apply the local half atomically from
        // this task's perspective.
        self.accounts.apply_admit(&user.id, &track.id, now).await;
        self.ledger
            .record_play(&track.id, Some(user.id.clone()), now)
            .await;

        let eta = self.estimate_eta(track).await;

        info!(
            user = %user.id,
            tier = %user.tier,
            track = %track.id,
            position = ?position,
            bypass = warning.is_some(),
            "track enqueued"
        );

        Ok(RequestOutcome::Accepted {
            result: EnqueueResult { position, eta },
            warning,
        })
    }

    /// Snapshot of per-tier in-flight enqueue counts.
    pub async fn in_flight_counts(&self) -> HashMap<Tier, usize> {
        self.in_flight.lock().await.clone()
    }

    /// Sums the durations of every track ahead of the freshly inserted one.
    ///
    /// The snapshot is re-read after the enqueue returns, because other
    /// requests and the notification scheduler interleave during the
    /// suspension; the inserted track's actual index is what counts.
    async fn estimate_eta(&self, track: &Track) -> Option<Eta> {
        let snapshot = match self.catalog.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(track = %track.id, error = %e, "snapshot unavailable for ETA");
                return None;
            }
        };

        let ahead: u64 = match snapshot.iter().position(|t| t.id == track.id) {
            Some(index) => snapshot[..index].iter().map(|t| t.duration_ms).sum(),
            // Not visible yet (backend lag): everything currently listed is ahead.
            None => snapshot.iter().map(|t| t.duration_ms).sum(),
        };

        Some(Eta::from_ms(ahead))
    }

    async fn track_in_flight(&self, tier: Tier, delta: isize) {
        let mut counts = self.in_flight.lock().await;
        let entry = counts.entry(tier).or_insert(0);
        if delta > 0 {
            *entry += delta as usize;
        } else {
            *entry = entry.saturating_sub((-delta) as usize);
        }
    }
}
