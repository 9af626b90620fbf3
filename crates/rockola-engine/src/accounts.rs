// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User account store.
//!
//! Accounts are created on first contact (tier Normal), mutated on every
//! accepted request and on tier changes, and removed only by the explicit
//! retention sweep. The daily request counter resets lazily: whenever an
//! account is touched on a new calendar day in the plaza's timezone, the
//! counter and the same-day duplicate set are cleared before any quota
//! check can observe them. There is no scheduled midnight job.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use rockola_core::{GeoPoint, Tier, TrackId, UserId};

/// A subscriber account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub display_name: Option<String>,
    pub tier: Tier,
    /// Accepted requests today. Never exceeds the tier's daily limit while
    /// that limit is finite.
    pub daily_request_count: u32,
    /// Track ids accepted today, for same-day duplicate prevention and for
    /// the coming-up reverse lookup.
    pub requests_today: BTreeSet<TrackId>,
    /// Lifetime accepted requests.
    pub total_requests: u64,
    pub registered_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub location_verified: bool,
    pub last_known_location: Option<GeoPoint>,
    /// Timestamp of the user's own last accepted request (personal cooldown).
    pub last_request_at: Option<DateTime<Utc>>,
    /// Timestamp of the last accepted VIP request (rolling-hour window).
    pub last_vip_request_at: Option<DateTime<Utc>>,
}

impl UserAccount {
    fn new(id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            display_name: None,
            tier: Tier::Normal,
            daily_request_count: 0,
            requests_today: BTreeSet::new(),
            total_requests: 0,
            registered_at: now,
            last_activity: now,
            location_verified: false,
            last_known_location: None,
            last_request_at: None,
            last_vip_request_at: None,
        }
    }
}

/// In-memory account map, keyed by subscriber id.
///
/// Explicitly constructed and injected; per-user message handling is
/// sequential (transport guarantee), so the map only needs to tolerate
/// cross-user interleaving.
pub struct AccountStore {
    accounts: Mutex<HashMap<UserId, UserAccount>>,
    /// Plaza-local timezone used for the calendar-day quota reset.
    tz: FixedOffset,
}

impl AccountStore {
    pub fn new(tz: FixedOffset) -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            tz,
        }
    }

    /// Returns a snapshot of the account, creating a Normal-tier account on
    /// first contact. Applies the lazy daily reset before returning, so the
    /// caller's quota check always sees a current counter.
    pub async fn get_or_create(&self, id: &UserId, now: DateTime<Utc>) -> UserAccount {
        let mut accounts = self.accounts.lock().await;
        let account = accounts.entry(id.clone()).or_insert_with(|| {
            info!(user = %id, "new subscriber registered");
            UserAccount::new(id.clone(), now)
        });
        Self::reset_daily_if_new_day(account, now, self.tz);
        account.last_activity = now;
        account.clone()
    }

    /// Applies the local-state side of an accepted request: bumps counters,
    /// records the same-day track, and stamps the tier-appropriate
    /// last-request timestamp.
    pub async fn apply_admit(&self, id: &UserId, track: &TrackId, now: DateTime<Utc>) {
        let mut accounts = self.accounts.lock().await;
        if let Some(account) = accounts.get_mut(id) {
            account.daily_request_count += 1;
            account.total_requests += 1;
            account.requests_today.insert(track.clone());
            account.last_request_at = Some(now);
            if account.tier == Tier::Vip {
                account.last_vip_request_at = Some(now);
            }
            account.last_activity = now;
            debug!(
                user = %id,
                track = %track,
                daily = account.daily_request_count,
                "request applied to account"
            );
        }
    }

    /// Reverses an accepted request after a successful cancellation:
    /// decrements the daily counter and removes the track from the
    /// same-day set, restoring both to their pre-admission values.
    pub async fn rollback_request(&self, id: &UserId, track: &TrackId) {
        let mut accounts = self.accounts.lock().await;
        if let Some(account) = accounts.get_mut(id) {
            if account.requests_today.remove(track) {
                account.daily_request_count = account.daily_request_count.saturating_sub(1);
                account.total_requests = account.total_requests.saturating_sub(1);
                info!(user = %id, track = %track, "request rolled back");
            }
        }
    }

    /// Records a shared location and marks the account location-verified.
    pub async fn record_location(&self, id: &UserId, point: GeoPoint, now: DateTime<Utc>) {
        let mut accounts = self.accounts.lock().await;
        let account = accounts
            .entry(id.clone())
            .or_insert_with(|| UserAccount::new(id.clone(), now));
        account.last_known_location = Some(point);
        account.location_verified = true;
        account.last_activity = now;
    }

    /// Administrative tier override (promotion or demotion).
    pub async fn set_tier(&self, id: &UserId, tier: Tier) -> bool {
        let mut accounts = self.accounts.lock().await;
        match accounts.get_mut(id) {
            Some(account) => {
                let previous = account.tier;
                account.tier = tier;
                info!(user = %id, from = %previous, to = %tier, "tier changed");
                true
            }
            None => false,
        }
    }

    /// Reverse lookup: who requested this track today?
    ///
    /// O(n) over active accounts. Acceptable at plaza scale on the 30s
    /// notification cadence; an explicit track-to-user index was considered
    /// and not adopted.
    pub async fn find_requester(&self, track: &TrackId) -> Option<UserAccount> {
        let accounts = self.accounts.lock().await;
        accounts
            .values()
            .find(|account| account.requests_today.contains(track))
            .cloned()
    }

    /// Retention sweep: removes accounts idle for more than `max_idle_days`.
    /// The only path that ever deletes an account.
    pub async fn retire_inactive(&self, now: DateTime<Utc>, max_idle_days: i64) -> usize {
        let mut accounts = self.accounts.lock().await;
        let before = accounts.len();
        accounts.retain(|_, account| now - account.last_activity <= Duration::days(max_idle_days));
        let removed = before - accounts.len();
        if removed > 0 {
            info!(removed, "inactive accounts retired");
        }
        removed
    }

    /// Exports all accounts for persistence.
    pub async fn export(&self) -> Vec<UserAccount> {
        self.accounts.lock().await.values().cloned().collect()
    }

    /// Imports a persisted snapshot, overwriting per id.
    pub async fn import(&self, records: Vec<UserAccount>) {
        let count = records.len();
        let mut accounts = self.accounts.lock().await;
        for account in records {
            accounts.insert(account.id.clone(), account);
        }
        info!(count, "accounts imported");
    }

    pub async fn len(&self) -> usize {
        self.accounts.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.lock().await.is_empty()
    }

    fn reset_daily_if_new_day(account: &mut UserAccount, now: DateTime<Utc>, tz: FixedOffset) {
        let today = now.with_timezone(&tz).date_naive();
        let last_day = account.last_activity.with_timezone(&tz).date_naive();
        if today != last_day {
            account.daily_request_count = 0;
            account.requests_today.clear();
            debug!(user = %account.id, "daily counters reset");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn plaza_tz() -> FixedOffset {
        // UTC-6, the plaza's local offset.
        FixedOffset::west_opt(6 * 3600).unwrap()
    }

    fn uid(s: &str) -> UserId {
        UserId(s.to_string())
    }

    fn tid(s: &str) -> TrackId {
        TrackId(s.to_string())
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 20, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn first_contact_creates_normal_account() {
        let store = AccountStore::new(plaza_tz());
        let account = store.get_or_create(&uid("5218441"), base_time()).await;
        assert_eq!(account.tier, Tier::Normal);
        assert_eq!(account.daily_request_count, 0);
        assert!(!account.location_verified);
    }

    #[tokio::test]
    async fn apply_admit_bumps_counters_and_stamps_timestamp() {
        let store = AccountStore::new(plaza_tz());
        let now = base_time();
        store.get_or_create(&uid("u"), now).await;
        store.apply_admit(&uid("u"), &tid("x"), now).await;

        let account = store.get_or_create(&uid("u"), now).await;
        assert_eq!(account.daily_request_count, 1);
        assert_eq!(account.total_requests, 1);
        assert!(account.requests_today.contains(&tid("x")));
        assert_eq!(account.last_request_at, Some(now));
        assert!(account.last_vip_request_at.is_none(), "non-VIP never stamps the VIP clock");
    }

    #[tokio::test]
    async fn vip_admit_stamps_the_vip_clock() {
        let store = AccountStore::new(plaza_tz());
        let now = base_time();
        store.get_or_create(&uid("v"), now).await;
        store.set_tier(&uid("v"), Tier::Vip).await;
        store.apply_admit(&uid("v"), &tid("x"), now).await;

        let account = store.get_or_create(&uid("v"), now).await;
        assert_eq!(account.last_vip_request_at, Some(now));
    }

    #[tokio::test]
    async fn daily_counters_reset_on_plaza_calendar_day_change() {
        let store = AccountStore::new(plaza_tz());
        // 20:00 UTC = 14:00 plaza time.
        let day_one = base_time();
        store.get_or_create(&uid("u"), day_one).await;
        store.apply_admit(&uid("u"), &tid("x"), day_one).await;

        // 05:00 UTC next day is 23:00 the SAME plaza day: no reset.
        let late_same_day = Utc.with_ymd_and_hms(2026, 3, 2, 5, 0, 0).unwrap();
        let account = store.get_or_create(&uid("u"), late_same_day).await;
        assert_eq!(account.daily_request_count, 1, "still the same plaza day");

        // 07:00 UTC is 01:00 the NEXT plaza day: counters reset.
        let next_plaza_day = Utc.with_ymd_and_hms(2026, 3, 2, 7, 0, 0).unwrap();
        let account = store.get_or_create(&uid("u"), next_plaza_day).await;
        assert_eq!(account.daily_request_count, 0);
        assert!(account.requests_today.is_empty());
        assert_eq!(account.total_requests, 1, "lifetime counter survives the reset");
    }

    #[tokio::test]
    async fn rollback_restores_pre_admission_values() {
        let store = AccountStore::new(plaza_tz());
        let now = base_time();
        store.get_or_create(&uid("u"), now).await;
        store.apply_admit(&uid("u"), &tid("a"), now).await;
        store.apply_admit(&uid("u"), &tid("b"), now).await;

        store.rollback_request(&uid("u"), &tid("a")).await;

        let account = store.get_or_create(&uid("u"), now).await;
        assert_eq!(account.daily_request_count, 1);
        assert!(!account.requests_today.contains(&tid("a")));
        assert!(account.requests_today.contains(&tid("b")));
    }

    #[tokio::test]
    async fn rollback_of_unknown_track_changes_nothing() {
        let store = AccountStore::new(plaza_tz());
        let now = base_time();
        store.get_or_create(&uid("u"), now).await;
        store.apply_admit(&uid("u"), &tid("a"), now).await;

        store.rollback_request(&uid("u"), &tid("never_queued")).await;

        let account = store.get_or_create(&uid("u"), now).await;
        assert_eq!(account.daily_request_count, 1);
    }

    #[tokio::test]
    async fn find_requester_scans_todays_requests() {
        let store = AccountStore::new(plaza_tz());
        let now = base_time();
        store.get_or_create(&uid("a"), now).await;
        store.get_or_create(&uid("b"), now).await;
        store.apply_admit(&uid("b"), &tid("x"), now).await;

        let owner = store.find_requester(&tid("x")).await;
        assert_eq!(owner.map(|a| a.id), Some(uid("b")));
        assert!(store.find_requester(&tid("y")).await.is_none());
    }

    #[tokio::test]
    async fn retire_inactive_removes_only_idle_accounts() {
        let store = AccountStore::new(plaza_tz());
        let now = base_time();
        store.get_or_create(&uid("old"), now - Duration::days(120)).await;
        store.get_or_create(&uid("recent"), now - Duration::days(3)).await;

        let removed = store.retire_inactive(now, 90).await;
        assert_eq!(removed, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn export_import_round_trip() {
        let store = AccountStore::new(plaza_tz());
        let now = base_time();
        store.get_or_create(&uid("u"), now).await;
        store.set_tier(&uid("u"), Tier::Premium).await;
        store.apply_admit(&uid("u"), &tid("x"), now).await;

        let snapshot = store.export().await;

        let restored = AccountStore::new(plaza_tz());
        restored.import(snapshot).await;

        let account = restored.get_or_create(&uid("u"), now).await;
        assert_eq!(account.tier, Tier::Premium);
        assert_eq!(account.daily_request_count, 1);
    }

    #[tokio::test]
    async fn set_tier_on_unknown_user_reports_false() {
        let store = AccountStore::new(plaza_tz());
        assert!(!store.set_tier(&uid("ghost"), Tier::Vip).await);
    }

    #[tokio::test]
    async fn record_location_marks_verified() {
        let store = AccountStore::new(plaza_tz());
        let now = base_time();
        let point = GeoPoint { lat: 25.42, lon: -101.0 };
        store.record_location(&uid("u"), point, now).await;

        let account = store.get_or_create(&uid("u"), now).await;
        assert!(account.location_verified);
        assert_eq!(account.last_known_location, Some(point));
    }
}
