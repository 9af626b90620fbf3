// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request engine facade: one inbound message in, at most one reply out.
//!
//! Dispatch order for a text message:
//! 1. Security screen (rate limit, flood, duplicates) -- duplicates are the
//!    only silent drop.
//! 2. Account upsert (first contact creates a Normal account) with the lazy
//!    daily reset applied.
//! 3. Pending coming-up notification replies, routed to the scheduler.
//! 4. Otherwise the text is a song request: resolve it against the catalog
//!    and run it through admission and enqueue.
//!
//! Location messages update the account's captured location. Collaborator
//! failures and programmer errors (unknown tier) are caught here, logged
//! with context, and answered with a transient-failure reply -- they are
//! fatal to the request, never to the process.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use rockola_core::types::{FilterAction, MessageContent};
use rockola_core::{Blocklist, Catalog, ContentFilter, GeofenceCheck, RockolaError, UserId};
use rockola_tiers::TierRegistry;

use crate::accounts::AccountStore;
use crate::admission::DenyReason;
use crate::ledger::RepetitionLedger;
use crate::notify::NotificationScheduler;
use crate::queue::{PlazaBounds, QueuePriorityEngine, RequestOutcome};
use crate::replies;
use crate::security::{ScreenOutcome, SecurityScreen};

pub struct RequestEngine {
    tiers: Arc<TierRegistry>,
    accounts: Arc<AccountStore>,
    ledger: Arc<RepetitionLedger>,
    queue: Arc<QueuePriorityEngine>,
    notifier: Arc<NotificationScheduler>,
    catalog: Arc<dyn Catalog>,
    filter: Arc<dyn ContentFilter>,
    blocklist: Arc<dyn Blocklist>,
    geofence: Arc<dyn GeofenceCheck>,
    security: SecurityScreen,
    plaza: PlazaBounds,
}

impl RequestEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tiers: Arc<TierRegistry>,
        accounts: Arc<AccountStore>,
        ledger: Arc<RepetitionLedger>,
        queue: Arc<QueuePriorityEngine>,
        notifier: Arc<NotificationScheduler>,
        catalog: Arc<dyn Catalog>,
        filter: Arc<dyn ContentFilter>,
        blocklist: Arc<dyn Blocklist>,
        geofence: Arc<dyn GeofenceCheck>,
        security: SecurityScreen,
        plaza: PlazaBounds,
    ) -> Self {
        Self {
            tiers,
            accounts,
            ledger,
            queue,
            notifier,
            catalog,
            filter,
            blocklist,
            geofence,
            security,
            plaza,
        }
    }

    /// Handles one inbound message. `None` means deliberate silence
    /// (duplicate suppression); every other decided request gets exactly
    /// one reply.
    pub async fn handle_message(
        &self,
        sender: &UserId,
        content: &MessageContent,
        now: DateTime<Utc>,
    ) -> Option<String> {
        match self.dispatch(sender, content, now).await {
            Ok(reply) => reply,
            Err(e) => {
                // Operational and programmer errors are fatal to this
                // request only. The user gets a transient-failure reply.
                error!(user = %sender, error = %e, "request handling failed");
                Some(replies::transient_failure())
            }
        }
    }

    async fn dispatch(
        &self,
        sender: &UserId,
        content: &MessageContent,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, RockolaError> {
        match content {
            MessageContent::Location(point) => {
                self.accounts.record_location(sender, *point, now).await;
                let inside =
                    self.geofence
                        .is_within(self.plaza.center, self.plaza.radius_km, *point);
                info!(user = %sender, inside, "location captured");
                Ok(Some(replies::location_recorded(inside)))
            }
            MessageContent::Text(text) => self.dispatch_text(sender, text, now).await,
        }
    }

    async fn dispatch_text(
        &self,
        sender: &UserId,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, RockolaError> {
        match self.security.screen(sender, text, now).await {
            ScreenOutcome::Pass => {}
            ScreenOutcome::Reject(reply) => return Ok(Some(reply)),
            ScreenOutcome::Silent => return Ok(None),
        }

        let account = self.accounts.get_or_create(sender, now).await;

        // A live coming-up prompt claims the user's next reply.
        if let Some(reply) = self.notifier.handle_reply(&account, text, now).await? {
            return Ok(Some(reply));
        }

        // Permanent block is terminal: no search, no further checks, and
        // nothing about quota or cooldown state is revealed.
        if self.blocklist.is_blocked(sender).await? {
            return Ok(Some(replies::deny(&DenyReason::PermanentlyBlocked)));
        }

        // Content screening on the raw text comes before the catalog is
        // even consulted; a filthy request never learns whether the song
        // exists.
        let filter = self.filter.evaluate(text).await?;
        if !filter.allowed {
            let reason = DenyReason::ContentRejected {
                severity: filter.severity,
                action: filter.recommended_action,
            };
            self.apply_filter_action(sender, &reason, now).await;
            info!(user = %sender, severity = %filter.severity, "request rejected by content filter");
            return Ok(Some(replies::deny(&reason)));
        }

        let Some(track) = self.catalog.search(text, 1).await?.into_iter().next() else {
            return Ok(Some(replies::no_results(text)));
        };

        let profile = self.tiers.profile_for(account.tier).await?;
        let outcome = self
            .queue
            .admit_and_enqueue(&account, &profile, &track, &filter, false, now)
            .await;

        match outcome {
            Ok(RequestOutcome::Accepted { result, warning }) => {
                let updated = self.accounts.get_or_create(sender, now).await;
                let mut reply = replies::accepted(
                    &track,
                    result.eta,
                    updated.daily_request_count,
                    profile.daily_limit,
                );
                if let Some(minutes_elapsed) = warning {
                    reply.push_str(&replies::repeat_warning(minutes_elapsed));
                }
                Ok(Some(reply))
            }
            Ok(RequestOutcome::Denied(reason)) => {
                self.apply_filter_action(sender, &reason, now).await;
                info!(user = %sender, reason = ?reason, "request denied");
                Ok(Some(replies::deny(&reason)))
            }
            Err(e) => {
                warn!(user = %sender, track = %track.id, error = %e, "enqueue failed");
                Ok(Some(replies::transient_failure()))
            }
        }
    }

    /// Applies the content filter's recommended account action after a
    /// content rejection. The admission controller only reports; the block
    /// state changes happen here.
    async fn apply_filter_action(&self, sender: &UserId, reason: &DenyReason, now: DateTime<Utc>) {
        let DenyReason::ContentRejected { action, severity } = reason else {
            return;
        };
        match action {
            FilterAction::Warn => {
                info!(user = %sender, severity = %severity, "content warning issued");
            }
            FilterAction::TempBlock => {
                self.security.temp_block(sender, now).await;
            }
            FilterAction::PermaBlock => {
                if let Err(e) = self.blocklist.block(sender).await {
                    error!(user = %sender, error = %e, "failed to apply permanent block");
                }
            }
        }
    }

    // Accessors for the admin panel and the maintenance timers.

    pub fn tiers(&self) -> &Arc<TierRegistry> {
        &self.tiers
    }

    pub fn accounts(&self) -> &Arc<AccountStore> {
        &self.accounts
    }

    pub fn ledger(&self) -> &Arc<RepetitionLedger> {
        &self.ledger
    }

    pub fn notifier(&self) -> &Arc<NotificationScheduler> {
        &self.notifier
    }

    pub fn queue(&self) -> &Arc<QueuePriorityEngine> {
        &self.queue
    }
}
