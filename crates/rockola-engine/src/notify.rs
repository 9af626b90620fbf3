// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification scheduler: proactive "your song is coming up" prompts.
//!
//! Per accepted request the lifecycle is
//! `Queued -> Notified -> {Confirmed | Cancelled | Expired}`.
//!
//! A polling tick (30s timer in the binary) watches the playlist snapshot;
//! when a track reaches index 2 (two songs away from playing) its requester
//! gets a one-shot prompt with a 3-minute response window. The
//! [`NotifiedTrackMarker`] is written BEFORE the transport send, so a
//! concurrent tick observing the same snapshot cannot double-send while the
//! first send is suspended on network I/O.
//!
//! Expiry is on-read-or-sweep: no per-entry timers are scheduled, so heavy
//! request volume cannot leak timers. An unanswered prompt is an implicit
//! confirmation -- the track stays queued either way, which is why the
//! sweep's bounded lag is harmless.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use rockola_core::types::Track;
use rockola_core::{Catalog, RockolaError, TrackId, Transport, UserId};
use rockola_tiers::{Capability, TierRegistry};

use crate::accounts::{AccountStore, UserAccount};
use crate::queue::Eta;
use crate::replies;

/// 0-based playlist index that triggers the prompt: two tracks remain
/// before the requested one plays.
pub const NOTIFY_QUEUE_INDEX: usize = 2;

/// How long a prompt waits for an answer before it counts as confirmed.
pub const RESPONSE_WINDOW_MINUTES: i64 = 3;

/// A prompt awaiting the requester's answer. At most one per user.
#[derive(Debug, Clone)]
pub struct PendingNotification {
    pub track: Track,
    pub created_at: DateTime<Utc>,
}

/// Prevents re-notifying for a track once anyone was notified for it.
#[derive(Debug, Clone)]
pub struct NotifiedTrackMarker {
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Serializable view of a pending prompt, for the admin panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingView {
    pub user_id: UserId,
    pub track_id: TrackId,
    pub created_at: DateTime<Utc>,
}

pub struct NotificationScheduler {
    catalog: Arc<dyn Catalog>,
    transport: Arc<dyn Transport>,
    accounts: Arc<AccountStore>,
    tiers: Arc<TierRegistry>,
    pending: Mutex<HashMap<UserId, PendingNotification>>,
    notified: Mutex<HashMap<TrackId, NotifiedTrackMarker>>,
}

impl NotificationScheduler {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        transport: Arc<dyn Transport>,
        accounts: Arc<AccountStore>,
        tiers: Arc<TierRegistry>,
    ) -> Self {
        Self {
            catalog,
            transport,
            accounts,
            tiers,
            pending: Mutex::new(HashMap::new()),
            notified: Mutex::new(HashMap::new()),
        }
    }

    /// One polling pass over the playlist.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<(), RockolaError> {
        let snapshot = self.catalog.snapshot().await?;
        if snapshot.len() <= NOTIFY_QUEUE_INDEX {
            return Ok(());
        }

        let track = snapshot[NOTIFY_QUEUE_INDEX].clone();

        // Fast path: already notified for this track.
        if self.notified.lock().await.contains_key(&track.id) {
            return Ok(());
        }

        let Some(owner) = self.accounts.find_requester(&track.id).await else {
            debug!(track = %track.id, "no requester found for coming-up track");
            return Ok(());
        };

        // Re-validate and claim the marker in one critical section. Writing
        // it before the send is what guarantees at-most-one notification
        // per track under concurrent ticks.
        {
            let mut notified = self.notified.lock().await;
            if notified.contains_key(&track.id) {
                return Ok(());
            }
            notified.insert(
                track.id.clone(),
                NotifiedTrackMarker {
                    user_id: owner.id.clone(),
                    created_at: now,
                },
            );
        }

        let eta = eta_for_index(&snapshot, NOTIFY_QUEUE_INDEX);
        let can_cancel = self.user_may_cancel(&owner).await;

        self.pending.lock().await.insert(
            owner.id.clone(),
            PendingNotification {
                track: track.clone(),
                created_at: now,
            },
        );

        let prompt = replies::coming_up(&track, eta, can_cancel);
        if let Err(e) = self.transport.send_message(&owner.id, &prompt).await {
            // The marker stays: better to lose one prompt than to double-send.
            warn!(user = %owner.id, track = %track.id, error = %e, "coming-up send failed");
        } else {
            info!(user = %owner.id, track = %track.id, "coming-up notification sent");
        }

        Ok(())
    }

    /// Routes a reply from a user who may have a pending prompt.
    ///
    /// Returns `None` when the user has no live prompt (including one that
    /// expired before they answered), in which case the caller treats the
    /// text as an ordinary message.
    pub async fn handle_reply(
        &self,
        user: &UserAccount,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, RockolaError> {
        let pending = {
            let mut pending = self.pending.lock().await;
            match pending.get(&user.id) {
                None => return Ok(None),
                Some(entry) if is_expired(entry.created_at, now) => {
                    // Expiry-on-read: implicit confirmation, prompt is gone.
                    pending.remove(&user.id);
                    return Ok(None);
                }
                Some(entry) => entry.clone(),
            }
        };

        let reply = text.trim().to_lowercase();

        if is_affirmative(&reply) {
            self.pending.lock().await.remove(&user.id);
            info!(user = %user.id, track = %pending.track.id, "coming-up confirmed");
            return Ok(Some(replies::notification_confirmed(&pending.track)));
        }

        if is_cancel(&reply) {
            if !self.user_may_cancel(user).await {
                // VIP: the request stays Notified until it expires.
                info!(user = %user.id, track = %pending.track.id, "cancel denied by tier");
                return Ok(Some(replies::vip_cancel_denied()));
            }
            return self.cancel(user, &pending).await.map(Some);
        }

        // Garbled reply: re-prompt, state unchanged, window not reset.
        Ok(Some(replies::notification_reprompt()))
    }

    /// Cancels a notified request: dequeues externally, then rolls back the
    /// local request state and clears both markers. On dequeue failure
    /// nothing local changes.
    async fn cancel(
        &self,
        user: &UserAccount,
        pending: &PendingNotification,
    ) -> Result<String, RockolaError> {
        if let Err(e) = self.catalog.dequeue(&pending.track.id).await {
            warn!(user = %user.id, track = %pending.track.id, error = %e, "dequeue failed");
            return Ok(replies::transient_failure());
        }

        self.accounts
            .rollback_request(&user.id, &pending.track.id)
            .await;
        self.pending.lock().await.remove(&user.id);
        self.notified.lock().await.remove(&pending.track.id);

        info!(user = %user.id, track = %pending.track.id, "request cancelled");
        Ok(replies::notification_cancelled(&pending.track))
    }

    /// Clears expired prompts and markers. Run from the 5-minute sweep;
    /// actual cleanup lag is bounded by the sweep interval.
    pub async fn sweep(&self, now: DateTime<Utc>) -> (usize, usize) {
        let mut pending = self.pending.lock().await;
        let pending_before = pending.len();
        pending.retain(|_, entry| !is_expired(entry.created_at, now));
        let pending_removed = pending_before - pending.len();
        drop(pending);

        let mut notified = self.notified.lock().await;
        let notified_before = notified.len();
        notified.retain(|_, marker| !is_expired(marker.created_at, now));
        let notified_removed = notified_before - notified.len();
        drop(notified);

        if pending_removed + notified_removed > 0 {
            debug!(pending_removed, notified_removed, "notification sweep");
        }
        (pending_removed, notified_removed)
    }

    /// Pending prompts, for support/debugging via the admin panel.
    pub async fn pending_snapshot(&self) -> Vec<PendingView> {
        self.pending
            .lock()
            .await
            .iter()
            .map(|(user_id, entry)| PendingView {
                user_id: user_id.clone(),
                track_id: entry.track.id.clone(),
                created_at: entry.created_at,
            })
            .collect()
    }

    async fn user_may_cancel(&self, user: &UserAccount) -> bool {
        match self.tiers.profile_for(user.tier).await {
            Ok(profile) => profile.has(Capability::CancelOwnRequest),
            Err(e) => {
                warn!(user = %user.id, error = %e, "no profile while checking cancel permission");
                false
            }
        }
    }
}

fn is_expired(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - created_at > Duration::minutes(RESPONSE_WINDOW_MINUTES)
}

fn is_affirmative(reply: &str) -> bool {
    reply == "1" || reply.contains("yes") || reply.contains("sí") || reply.contains("si")
}

fn is_cancel(reply: &str) -> bool {
    reply == "2" || reply.contains("no") || reply.contains("cancel")
}

fn eta_for_index(snapshot: &[Track], index: usize) -> Eta {
    let total_ms: u64 = snapshot[..index].iter().map(|t| t.duration_ms).sum();
    Eta {
        minutes: total_ms / 60_000,
        seconds: (total_ms % 60_000) / 1000,
    }
}
