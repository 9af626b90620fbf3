// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pre-admission transport hygiene: rate limiting, flood detection,
//! duplicate suppression, and basic message validation.
//!
//! This screen runs before the account is even touched. Rejections here are
//! not policy denials -- they are abuse protection. Duplicate messages are
//! the one case where the engine deliberately stays silent; everything else
//! gets exactly one reply.
//!
//! All windows are expiry-on-read: timestamps are filtered against `now`
//! when a user is screened, so no cleanup timers are needed.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

use rockola_core::UserId;

/// Tunable limits for the security screen.
#[derive(Debug, Clone, Copy)]
pub struct SecurityLimits {
    /// Messages allowed per rolling minute.
    pub rate_limit_per_minute: usize,
    /// Messages within the flood window that trigger a temp block.
    pub flood_threshold: usize,
    /// Flood detection window, in seconds.
    pub flood_window_secs: i64,
    /// How long a flood temp block lasts, in minutes.
    pub temp_block_minutes: i64,
    /// Maximum accepted message length, in characters.
    pub max_message_len: usize,
}

impl Default for SecurityLimits {
    fn default() -> Self {
        Self {
            rate_limit_per_minute: 20,
            flood_threshold: 5,
            flood_window_secs: 10,
            temp_block_minutes: 60,
            max_message_len: 500,
        }
    }
}

/// Result of screening one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenOutcome {
    Pass,
    /// Reject with a reply naming the reason.
    Reject(String),
    /// Reject without any reply (duplicate suppression only).
    Silent,
}

/// How long an identical message is treated as a duplicate.
const DUPLICATE_WINDOW_SECS: i64 = 30;

pub struct SecurityScreen {
    limits: SecurityLimits,
    /// Message timestamps within the rolling rate-limit minute.
    recent: Mutex<HashMap<UserId, Vec<DateTime<Utc>>>>,
    /// Message timestamps within the flood window.
    bursts: Mutex<HashMap<UserId, Vec<DateTime<Utc>>>>,
    /// Last message text per user, for duplicate suppression.
    last_message: Mutex<HashMap<UserId, (String, DateTime<Utc>)>>,
    /// Temp-blocked users and when their block lifts.
    temp_blocks: Mutex<HashMap<UserId, DateTime<Utc>>>,
}

impl SecurityScreen {
    pub fn new(limits: SecurityLimits) -> Self {
        Self {
            limits,
            recent: Mutex::new(HashMap::new()),
            bursts: Mutex::new(HashMap::new()),
            last_message: Mutex::new(HashMap::new()),
            temp_blocks: Mutex::new(HashMap::new()),
        }
    }

    /// Screens one text message. Check order: temp block, validity,
    /// duplicate (silent), flood, rate limit.
    pub async fn screen(&self, user: &UserId, text: &str, now: DateTime<Utc>) -> ScreenOutcome {
        if self.is_temp_blocked(user, now).await {
            return ScreenOutcome::Reject(
                "You are temporarily blocked for suspicious activity. Try again later."
                    .to_string(),
            );
        }

        if !self.is_valid_message(text) {
            return ScreenOutcome::Reject("Message invalid or too long.".to_string());
        }

        if self.is_duplicate(user, text, now).await {
            return ScreenOutcome::Silent;
        }

        if self.is_flooding(user, now).await {
            self.temp_block(user, now).await;
            return ScreenOutcome::Reject(
                "Too many messages at once. You are blocked for one hour.".to_string(),
            );
        }

        if self.exceeds_rate_limit(user, now).await {
            return ScreenOutcome::Reject(
                "Too many requests. Wait a moment before sending more.".to_string(),
            );
        }

        ScreenOutcome::Pass
    }

    /// Temp-blocks a user, also used when the content filter recommends it.
    pub async fn temp_block(&self, user: &UserId, now: DateTime<Utc>) {
        let until = now + Duration::minutes(self.limits.temp_block_minutes);
        self.temp_blocks.lock().await.insert(user.clone(), until);
        warn!(user = %user, until = %until, "user temp-blocked");
    }

    /// Lifts a temp block early (admin operation).
    pub async fn lift_temp_block(&self, user: &UserId) {
        if self.temp_blocks.lock().await.remove(user).is_some() {
            info!(user = %user, "temp block lifted");
        }
    }

    async fn is_temp_blocked(&self, user: &UserId, now: DateTime<Utc>) -> bool {
        let mut blocks = self.temp_blocks.lock().await;
        match blocks.get(user) {
            Some(until) if *until > now => true,
            Some(_) => {
                blocks.remove(user);
                false
            }
            None => false,
        }
    }

    fn is_valid_message(&self, text: &str) -> bool {
        if text.is_empty() || text.chars().count() > self.limits.max_message_len {
            return false;
        }
        // Repeated-character spam: any run of 11+ identical characters.
        let mut run = 0usize;
        let mut last = None;
        for c in text.chars() {
            if Some(c) == last {
                run += 1;
                if run > 10 {
                    return false;
                }
            } else {
                run = 1;
                last = Some(c);
            }
        }
        true
    }

    async fn is_duplicate(&self, user: &UserId, text: &str, now: DateTime<Utc>) -> bool {
        let mut last = self.last_message.lock().await;
        let duplicate = matches!(
            last.get(user),
            Some((prev, at)) if prev == text && now - *at <= Duration::seconds(DUPLICATE_WINDOW_SECS)
        );
        last.insert(user.clone(), (text.to_string(), now));
        duplicate
    }

    async fn is_flooding(&self, user: &UserId, now: DateTime<Utc>) -> bool {
        let window = Duration::seconds(self.limits.flood_window_secs);
        let mut bursts = self.bursts.lock().await;
        let entry = bursts.entry(user.clone()).or_default();
        entry.retain(|ts| now - *ts < window);
        entry.push(now);
        entry.len() > self.limits.flood_threshold
    }

    async fn exceeds_rate_limit(&self, user: &UserId, now: DateTime<Utc>) -> bool {
        let mut recent = self.recent.lock().await;
        let entry = recent.entry(user.clone()).or_default();
        entry.retain(|ts| now - *ts < Duration::minutes(1));
        if entry.len() >= self.limits.rate_limit_per_minute {
            return true;
        }
        entry.push(now);
        false
    }
}

impl Default for SecurityScreen {
    fn default() -> Self {
        Self::new(SecurityLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn uid() -> UserId {
        UserId("5218441".into())
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 20, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn ordinary_message_passes() {
        let screen = SecurityScreen::default();
        assert_eq!(
            screen.screen(&uid(), "la puerta negra", base_time()).await,
            ScreenOutcome::Pass
        );
    }

    #[tokio::test]
    async fn duplicate_within_window_is_silent() {
        let screen = SecurityScreen::default();
        let now = base_time();
        assert_eq!(screen.screen(&uid(), "same song", now).await, ScreenOutcome::Pass);
        assert_eq!(
            screen.screen(&uid(), "same song", now + Duration::seconds(5)).await,
            ScreenOutcome::Silent
        );
        // Past the duplicate window the same text is fine again.
        assert_eq!(
            screen.screen(&uid(), "same song", now + Duration::seconds(40)).await,
            ScreenOutcome::Pass
        );
    }

    #[tokio::test]
    async fn flood_triggers_temp_block() {
        let screen = SecurityScreen::default();
        let now = base_time();

        let mut outcome = ScreenOutcome::Pass;
        for i in 0..7 {
            outcome = screen
                .screen(&uid(), &format!("msg {i}"), now + Duration::milliseconds(i * 500))
                .await;
        }
        assert!(matches!(outcome, ScreenOutcome::Reject(_)), "flood should reject");

        // Subsequent messages hit the temp block.
        let later = now + Duration::minutes(5);
        match screen.screen(&uid(), "hello again", later).await {
            ScreenOutcome::Reject(reply) => assert!(reply.contains("blocked"), "{reply}"),
            other => panic!("expected temp-block rejection, got {other:?}"),
        }

        // The block expires on read after its window.
        let after = now + Duration::minutes(61);
        assert_eq!(
            screen.screen(&uid(), "hello again", after).await,
            ScreenOutcome::Pass
        );
    }

    #[tokio::test]
    async fn rate_limit_rejects_past_twenty_per_minute() {
        let screen = SecurityScreen::default();
        let now = base_time();

        // Spread out enough to dodge flood detection.
        let mut last = ScreenOutcome::Pass;
        for i in 0..21 {
            last = screen
                .screen(&uid(), &format!("query {i}"), now + Duration::seconds(i * 2))
                .await;
        }
        match last {
            ScreenOutcome::Reject(reply) => assert!(reply.contains("Wait"), "{reply}"),
            other => panic!("expected rate-limit rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn oversized_and_spammy_messages_are_invalid() {
        let screen = SecurityScreen::default();
        let now = base_time();

        let long = "a".repeat(501);
        assert!(matches!(
            screen.screen(&uid(), &long, now).await,
            ScreenOutcome::Reject(_)
        ));

        assert!(matches!(
            screen.screen(&uid(), "aaaaaaaaaaaaaaa", now).await,
            ScreenOutcome::Reject(_)
        ));

        assert!(matches!(
            screen.screen(&uid(), "", now).await,
            ScreenOutcome::Reject(_)
        ));
    }

    #[tokio::test]
    async fn lift_temp_block_restores_access() {
        let screen = SecurityScreen::default();
        let now = base_time();
        screen.temp_block(&uid(), now).await;
        assert!(matches!(
            screen.screen(&uid(), "hi", now).await,
            ScreenOutcome::Reject(_)
        ));

        screen.lift_temp_block(&uid()).await;
        assert_eq!(screen.screen(&uid(), "hi again", now).await, ScreenOutcome::Pass);
    }
}
