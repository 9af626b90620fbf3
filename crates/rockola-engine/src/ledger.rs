// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repetition ledger: the anti-repeat window over the shared playlist.
//!
//! Every accepted track is recorded here with its acceptance time and
//! requester. A track is "in cooldown" while less than [`REPEAT_WINDOW`]
//! has passed since it was last recorded; a newer play resets the clock.
//! Entries older than twice the window are pruned by a periodic sweep, and
//! the whole map can be exported/imported as a flat list for persistence
//! across restarts.
//!
//! The ledger is an explicitly constructed, dependency-injected store, not
//! a process-wide singleton: tests build as many independent instances as
//! they need. Every time-dependent operation takes `now` as a parameter so
//! time passage is simulated, never slept.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use rockola_core::{TrackId, UserId};

/// How long a previously queued track is rejected for new requests.
pub const REPEAT_WINDOW_MINUTES: i64 = 60;

/// Entries older than this are removed by [`RepetitionLedger::prune`].
/// Twice the repeat window: an expired entry still answers "how long ago"
/// for a while before the sweep reclaims it.
pub const PRUNE_AGE_MINUTES: i64 = 2 * REPEAT_WINDOW_MINUTES;

/// A single play record.
#[derive(Debug, Clone, PartialEq)]
pub struct RepetitionRecord {
    /// When the track was accepted into the queue.
    pub played_at: DateTime<Utc>,
    /// Who requested it. `None` for admin-seeded history.
    pub requested_by: Option<UserId>,
}

/// Answer to a cooldown query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownStatus {
    pub in_cooldown: bool,
    pub minutes_elapsed: i64,
    pub minutes_remaining: i64,
}

impl CooldownStatus {
    /// Status for a track with no record: not cooling down.
    pub fn clear() -> Self {
        Self {
            in_cooldown: false,
            minutes_elapsed: 0,
            minutes_remaining: 0,
        }
    }
}

/// Wire shape for persistence: `[{trackId, playedAt: epoch-ms, requestedBy|null}]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub track_id: TrackId,
    /// Epoch milliseconds.
    pub played_at: i64,
    pub requested_by: Option<UserId>,
}

/// A currently cooling-down track, for the admin panel listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoolingTrack {
    pub track_id: TrackId,
    pub requested_by: Option<UserId>,
    pub minutes_remaining: i64,
}

/// In-memory map from track id to its most recent play record.
pub struct RepetitionLedger {
    entries: Mutex<HashMap<TrackId, RepetitionRecord>>,
}

impl RepetitionLedger {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Records that a track was accepted into the queue.
    ///
    /// Unconditional upsert: a newer play overwrites the prior record and
    /// resets the cooldown clock. `requested_by = None` is valid (admin-
    /// seeded history).
    pub async fn record_play(
        &self,
        track: &TrackId,
        requested_by: Option<UserId>,
        now: DateTime<Utc>,
    ) {
        self.entries.lock().await.insert(
            track.clone(),
            RepetitionRecord {
                played_at: now,
                requested_by,
            },
        );
        debug!(track = %track, "track recorded in repetition ledger");
    }

    /// Pure read: is this track still cooling down at `now`?
    ///
    /// An absent record means not in cooldown. Elapsed minutes round down,
    /// remaining minutes round up, matching what users are told.
    pub async fn check_cooldown(&self, track: &TrackId, now: DateTime<Utc>) -> CooldownStatus {
        let entries = self.entries.lock().await;
        let Some(record) = entries.get(track) else {
            return CooldownStatus::clear();
        };

        let elapsed_ms = (now - record.played_at).num_milliseconds();
        let window_ms = REPEAT_WINDOW_MINUTES * 60_000;

        if elapsed_ms < window_ms {
            let remaining_ms = window_ms - elapsed_ms;
            CooldownStatus {
                in_cooldown: true,
                minutes_elapsed: elapsed_ms / 60_000,
                minutes_remaining: (remaining_ms as u64).div_ceil(60_000) as i64,
            }
        } else {
            CooldownStatus {
                in_cooldown: false,
                minutes_elapsed: elapsed_ms / 60_000,
                minutes_remaining: 0,
            }
        }
    }

    /// Removes records older than [`PRUNE_AGE_MINUTES`]. Returns the number
    /// removed. Run from the 30-minute maintenance sweep.
    pub async fn prune(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, record| (now - record.played_at).num_minutes() <= PRUNE_AGE_MINUTES);
        let removed = before - entries.len();
        if removed > 0 {
            info!(removed, "repetition ledger pruned");
        }
        removed
    }

    /// Exports the whole ledger as a flat list for persistence.
    pub async fn export(&self) -> Vec<LedgerEntry> {
        self.entries
            .lock()
            .await
            .iter()
            .map(|(track_id, record)| LedgerEntry {
                track_id: track_id.clone(),
                played_at: record.played_at.timestamp_millis(),
                requested_by: record.requested_by.clone(),
            })
            .collect()
    }

    /// Imports a persisted snapshot. Upsert semantics per record: each key
    /// is overwritten, nothing beyond per-key replacement is merged.
    pub async fn import(&self, records: Vec<LedgerEntry>) {
        let count = records.len();
        let mut entries = self.entries.lock().await;
        for entry in records {
            let Some(played_at) = Utc.timestamp_millis_opt(entry.played_at).single() else {
                debug!(track = %entry.track_id, "skipping ledger entry with invalid timestamp");
                continue;
            };
            entries.insert(
                entry.track_id,
                RepetitionRecord {
                    played_at,
                    requested_by: entry.requested_by,
                },
            );
        }
        info!(count, "repetition ledger imported");
    }

    /// Tracks currently inside the repeat window, most-recently-played
    /// first (largest remaining cooldown), for the admin panel.
    pub async fn cooling_down(&self, now: DateTime<Utc>) -> Vec<CoolingTrack> {
        let entries = self.entries.lock().await;
        let window_ms = REPEAT_WINDOW_MINUTES * 60_000;
        let mut cooling: Vec<CoolingTrack> = entries
            .iter()
            .filter_map(|(track_id, record)| {
                let elapsed_ms = (now - record.played_at).num_milliseconds();
                (elapsed_ms < window_ms).then(|| CoolingTrack {
                    track_id: track_id.clone(),
                    requested_by: record.requested_by.clone(),
                    minutes_remaining: ((window_ms - elapsed_ms) as u64).div_ceil(60_000) as i64,
                })
            })
            .collect();
        cooling.sort_by(|a, b| b.minutes_remaining.cmp(&a.minutes_remaining));
        cooling
    }

    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl Default for RepetitionLedger {
    fn default() -> Self {
        Self::new()
    }
}
