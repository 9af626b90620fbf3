// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end scenarios for the song-request pipeline, driven through the
//! request engine against mock collaborators with a simulated clock.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use rockola_core::types::{GeoPoint, MessageContent, Track};
use rockola_core::{GeofenceCheck, Tier, TrackId, UserId};
use rockola_engine::{
    AccountStore, HaversineGeofence, NotificationScheduler, PlazaBounds, QueuePriorityEngine,
    RepetitionLedger, RequestEngine, SecurityLimits, SecurityScreen,
};
use rockola_test_utils::{MockBlocklist, MockCatalog, MockFilter, MockTransport};
use rockola_tiers::{DailyLimits, TierRegistry};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 20, 0, 0).unwrap()
}

fn plaza_center() -> GeoPoint {
    GeoPoint { lat: 25.42, lon: -101.0 }
}

fn track(id: &str, name: &str) -> Track {
    Track {
        id: TrackId(id.into()),
        name: name.into(),
        artists: vec!["Los Plebes".into()],
        duration_ms: 200_000,
    }
}

fn uid(s: &str) -> UserId {
    UserId(s.into())
}

struct World {
    catalog: Arc<MockCatalog>,
    transport: Arc<MockTransport>,
    accounts: Arc<AccountStore>,
    ledger: Arc<RepetitionLedger>,
    notifier: Arc<NotificationScheduler>,
    engine: RequestEngine,
}

fn world() -> World {
    let catalog = Arc::new(MockCatalog::new());
    let transport = Arc::new(MockTransport::new());
    let filter = Arc::new(MockFilter::new());
    let blocklist = Arc::new(MockBlocklist::new());
    let tiers = Arc::new(TierRegistry::new(DailyLimits::default()));
    let accounts = Arc::new(AccountStore::new(
        chrono::FixedOffset::west_opt(6 * 3600).unwrap(),
    ));
    let ledger = Arc::new(RepetitionLedger::new());
    let geofence: Arc<dyn GeofenceCheck> = Arc::new(HaversineGeofence);
    let plaza = PlazaBounds {
        center: plaza_center(),
        radius_km: 0.2,
    };
    let queue = Arc::new(QueuePriorityEngine::new(
        catalog.clone(),
        ledger.clone(),
        accounts.clone(),
        plaza,
        geofence.clone(),
    ));
    let notifier = Arc::new(NotificationScheduler::new(
        catalog.clone(),
        transport.clone(),
        accounts.clone(),
        tiers.clone(),
    ));
    let engine = RequestEngine::new(
        tiers,
        accounts.clone(),
        ledger.clone(),
        queue,
        notifier.clone(),
        catalog.clone(),
        filter,
        blocklist,
        geofence,
        SecurityScreen::new(SecurityLimits::default()),
        plaza,
    );
    World {
        catalog,
        transport,
        accounts,
        ledger,
        notifier,
        engine,
    }
}

async fn arrive_at_plaza(w: &World, user: &str, now: DateTime<Utc>) {
    w.engine
        .handle_message(&uid(user), &MessageContent::Location(plaza_center()), now)
        .await
        .expect("location reply");
}

async fn request(w: &World, user: &str, text: &str, now: DateTime<Utc>) -> String {
    w.engine
        .handle_message(&uid(user), &MessageContent::Text(text.into()), now)
        .await
        .expect("one reply per decided request")
}

/// Scenario A: a Normal user at 3/3 daily quota submits a valid track.
/// Verdict is QuotaExceeded and the catalog never sees an enqueue.
#[tokio::test]
async fn scenario_a_quota_exceeded_makes_no_enqueue_call() {
    let w = world();
    let mut now = base_time();
    arrive_at_plaza(&w, "normal", now).await;

    for i in 0..3 {
        w.catalog.add_search_result(track(&format!("t{i}"), &format!("Song {i}"))).await;
        // Space requests beyond the 60-minute personal cooldown.
        now = now + Duration::minutes(61);
        let reply = request(&w, "normal", &format!("song {i}"), now).await;
        assert!(reply.contains("Song added"), "setup request {i} failed: {reply}");
    }

    let enqueues_before = w.catalog.enqueue_calls().await;
    now = now + Duration::minutes(61);
    w.catalog.add_search_result(track("t4", "One Too Many")).await;
    let reply = request(&w, "normal", "one too many", now).await;

    assert!(reply.contains("limit of 3"), "{reply}");
    assert_eq!(w.catalog.enqueue_calls().await, enqueues_before);
}

/// Scenario B: a Normal user inside the geofence, first request of the day,
/// track not in the ledger: admitted, appended, ledger records the play.
#[tokio::test]
async fn scenario_b_first_request_appends_and_records() {
    let w = world();
    let now = base_time();
    w.catalog.set_queue(vec![track("playing", "Now Playing")]).await;
    w.catalog.add_search_result(track("x", "La Puerta Negra")).await;
    arrive_at_plaza(&w, "normal", now).await;

    let reply = request(&w, "normal", "la puerta negra", now).await;
    assert!(reply.contains("Song added"), "{reply}");

    // Appended after the now-playing track.
    let queue = w.catalog.queue_ids().await;
    assert_eq!(queue.last().map(|t| t.as_str()), Some("x"));

    // Ledger now holds the play with playedAt = now.
    let status = w.ledger.check_cooldown(&TrackId("x".into()), now).await;
    assert!(status.in_cooldown);
    assert_eq!(status.minutes_elapsed, 0);
}

/// Scenario C: the same track requested by a different Normal user 10
/// minutes later is denied with roughly 50 minutes remaining.
#[tokio::test]
async fn scenario_c_repeat_window_blocks_other_users() {
    let w = world();
    let now = base_time();
    w.catalog.add_search_result(track("x", "La Puerta Negra")).await;
    arrive_at_plaza(&w, "first", now).await;
    request(&w, "first", "la puerta negra", now).await;

    let later = now + Duration::minutes(10);
    arrive_at_plaza(&w, "second", later).await;
    let reply = request(&w, "second", "la puerta negra", later).await;

    assert!(reply.contains("played recently"), "{reply}");
    assert!(reply.contains("50 minutes"), "{reply}");
}

/// Scenario D: a Technician requests the same track 10 minutes after
/// scenario B: admitted with a warning, and the ledger clock resets.
#[tokio::test]
async fn scenario_d_technician_bypass_updates_ledger() {
    let w = world();
    let now = base_time();
    w.catalog.add_search_result(track("x", "La Puerta Negra")).await;
    arrive_at_plaza(&w, "someone", now).await;
    request(&w, "someone", "la puerta negra", now).await;

    let later = now + Duration::minutes(10);
    arrive_at_plaza(&w, "tech", later).await;
    w.accounts.set_tier(&uid("tech"), Tier::Technician).await;
    let reply = request(&w, "tech", "la puerta negra", later).await;

    assert!(reply.contains("Song added"), "{reply}");
    assert!(reply.contains("10 minutes ago"), "{reply}");

    // playedAt was updated to the technician's play.
    let status = w.ledger.check_cooldown(&TrackId("x".into()), later).await;
    assert!(status.in_cooldown);
    assert_eq!(status.minutes_elapsed, 0, "clock reset to the new play");
}

/// Scenario E: a VIP's request reaches queue index 2 and is notified; the
/// cancel attempt is rebuffed; after the window the sweep clears markers
/// and the track is still queued.
#[tokio::test]
async fn scenario_e_vip_notification_is_cancellation_immune() {
    let w = world();
    let now = base_time();
    arrive_at_plaza(&w, "vip", now).await;
    w.accounts.set_tier(&uid("vip"), Tier::Vip).await;

    // VIP request lands at the front (index 1, after now playing).
    w.catalog
        .set_queue(vec![track("playing", "Now"), track("q1", "Next"), track("q2", "Later")])
        .await;
    w.catalog.add_search_result(track("vip-song", "Amor Eterno")).await;
    let reply = request(&w, "vip", "amor eterno", now).await;
    assert!(reply.contains("Song added"), "{reply}");

    // Two tracks play; the VIP song drifts to index 2 in the backend's view.
    w.catalog
        .set_queue(vec![
            track("q1", "Next"),
            track("q2", "Later"),
            track("vip-song", "Amor Eterno"),
        ])
        .await;

    let tick_time = now + Duration::minutes(5);
    w.notifier.tick(tick_time).await.unwrap();
    let sent = w.transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("cannot be cancelled"), "{}", sent[0].1);

    // The VIP replies "2" (cancel): immunity message, state unchanged.
    let reply = request(&w, "vip", "2", tick_time + Duration::minutes(1)).await;
    assert!(reply.contains("priority"), "{reply}");
    assert_eq!(w.catalog.dequeue_calls().await, 0);
    assert_eq!(w.notifier.pending_snapshot().await.len(), 1);

    // Three minutes pass with no further reply; the sweep clears markers
    // and the track is still in the queue.
    w.notifier.sweep(tick_time + Duration::minutes(4)).await;
    assert!(w.notifier.pending_snapshot().await.is_empty());
    assert!(w.catalog.queue_ids().await.contains(&TrackId("vip-song".into())));
}

/// P1: the daily counter rises by exactly one per acceptance and never
/// moves on a denial.
#[tokio::test]
async fn quota_counter_is_monotonic_across_outcomes() {
    let w = world();
    let mut now = base_time();
    arrive_at_plaza(&w, "u", now).await;

    w.catalog.add_search_result(track("a", "First")).await;
    now = now + Duration::minutes(61);
    request(&w, "u", "first", now).await;
    let count_after_first = w.accounts.get_or_create(&uid("u"), now).await.daily_request_count;
    assert_eq!(count_after_first, 1);

    // Denied by personal cooldown: counter unchanged.
    w.catalog.add_search_result(track("b", "Second")).await;
    let reply = request(&w, "u", "second", now + Duration::minutes(5)).await;
    assert!(reply.contains("next song"), "{reply}");
    let count_after_deny = w
        .accounts
        .get_or_create(&uid("u"), now + Duration::minutes(5))
        .await
        .daily_request_count;
    assert_eq!(count_after_deny, 1);
}

/// The plaza calendar day rollover resets the quota without any scheduled
/// job: the next request simply sees a fresh counter.
#[tokio::test]
async fn quota_resets_lazily_on_next_day() {
    let w = world();
    let now = base_time();
    arrive_at_plaza(&w, "u", now).await;
    w.catalog.add_search_result(track("a", "Song")).await;
    request(&w, "u", "song", now).await;

    // Next plaza-local day (UTC-6): 07:00 UTC is past local midnight.
    let next_day = Utc.with_ymd_and_hms(2026, 3, 2, 7, 0, 0).unwrap();
    let account = w.accounts.get_or_create(&uid("u"), next_day).await;
    assert_eq!(account.daily_request_count, 0);
    assert!(account.requests_today.is_empty());
}
