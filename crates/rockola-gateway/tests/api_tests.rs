// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the gateway routes, driven through the router
//! without binding a socket.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use rockola_core::types::GeoPoint;
use rockola_core::{GeofenceCheck, Tier, TrackId, UserId};
use rockola_engine::{
    AccountStore, HaversineGeofence, NotificationScheduler, PlazaBounds, QueuePriorityEngine,
    RepetitionLedger, RequestEngine, SecurityLimits, SecurityScreen,
};
use rockola_gateway::{build_router, AuthConfig, GatewayState};
use rockola_test_utils::{MockBlocklist, MockCatalog, MockFilter, MockTransport};
use rockola_tiers::{DailyLimits, TierRegistry};

const TOKEN: &str = "test-token";

fn test_state() -> (GatewayState, Arc<MockCatalog>) {
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
        center: GeoPoint { lat: 25.42, lon: -101.0 },
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
        transport,
        accounts.clone(),
        tiers.clone(),
    ));
    let engine = Arc::new(RequestEngine::new(
        tiers,
        accounts,
        ledger,
        queue,
        notifier,
        catalog.clone(),
        filter,
        blocklist,
        geofence,
        SecurityScreen::new(SecurityLimits::default()),
        plaza,
    ));

    let state = GatewayState {
        engine,
        auth: AuthConfig {
            bearer_token: Some(TOKEN.to_string()),
        },
        start_time: Instant::now(),
    };
    (state, catalog)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {TOKEN}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let (state, _) = test_state();
    let app = build_router(state);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn admin_routes_reject_missing_token() {
    let (state, _) = test_state();
    let app = build_router(state);

    let response = app
        .oneshot(Request::get("/v1/tiers").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_reject_wrong_token() {
    let (state, _) = test_state();
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::get("/v1/ledger")
                .header("authorization", "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn webhook_location_message_round_trips() {
    let (state, _) = test_state();
    let app = build_router(state);

    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/messages",
            serde_json::json!({
                "user_id": "5218441",
                "location": {"lat": 25.42, "lon": -101.0}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let reply = json["reply"].as_str().unwrap();
    assert!(reply.contains("confirmed"), "{reply}");
}

#[tokio::test]
async fn webhook_rejects_ambiguous_body() {
    let (state, _) = test_state();
    let app = build_router(state);

    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/messages",
            serde_json::json!({
                "user_id": "u",
                "text": "song",
                "location": {"lat": 1.0, "lon": 2.0}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tier_profile_read_and_replace() {
    let (state, _) = test_state();
    let app = build_router(state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::get("/v1/tiers/premium")
                .header("authorization", format!("Bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut profile = body_json(response).await;
    profile["daily_limit"] = serde_json::json!(9);

    let response = app
        .clone()
        .oneshot(json_request("PUT", "/v1/tiers/premium", profile))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let stored = state
        .engine
        .tiers()
        .profile_for(Tier::Premium)
        .await
        .unwrap();
    assert_eq!(stored.daily_limit, Some(9));
}

#[tokio::test]
async fn unknown_tier_is_404() {
    let (state, _) = test_state();
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::get("/v1/tiers/dj")
                .header("authorization", format!("Bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_tier_override_requires_existing_user() {
    let (state, _) = test_state();
    let app = build_router(state.clone());

    // Unknown user: 404.
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/v1/users/ghost/tier",
            serde_json::json!({"tier": "vip"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Known user: promoted.
    let user = UserId("5218441".into());
    state
        .engine
        .accounts()
        .get_or_create(&user, chrono::Utc::now())
        .await;
    let response = app
        .oneshot(json_request(
            "PUT",
            "/v1/users/5218441/tier",
            serde_json::json!({"tier": "vip"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let account = state
        .engine
        .accounts()
        .get_or_create(&user, chrono::Utc::now())
        .await;
    assert_eq!(account.tier, Tier::Vip);
}

#[tokio::test]
async fn ledger_injection_shows_in_cooling_listing() {
    let (state, _) = test_state();
    let app = build_router(state.clone());

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/ledger",
            serde_json::json!({"trackId": "spotify:track:abc", "requestedBy": null}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::get("/v1/ledger")
                .header("authorization", format!("Bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["trackId"], "spotify:track:abc");

    // The injected record is a real ledger entry.
    let status = state
        .engine
        .ledger()
        .check_cooldown(&TrackId("spotify:track:abc".into()), chrono::Utc::now())
        .await;
    assert!(status.in_cooldown);
}

#[tokio::test]
async fn retire_sweep_reports_removed_count() {
    let (state, _) = test_state();
    let app = build_router(state.clone());

    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/users/retire",
            serde_json::json!({"max_idle_days": 30}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["removed"], 0);
}

#[tokio::test]
async fn stats_reports_counts() {
    let (state, _) = test_state();
    let app = build_router(state.clone());

    state
        .engine
        .accounts()
        .get_or_create(&UserId("u1".into()), chrono::Utc::now())
        .await;

    let response = app
        .oneshot(
            Request::get("/v1/stats")
                .header("authorization", format!("Bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["accounts"], 1);
    assert_eq!(json["ledger_entries"], 0);
    assert_eq!(json["pending_notifications"], 0);
}

#[tokio::test]
async fn notifications_listing_starts_empty() {
    let (state, _) = test_state();
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::get("/v1/notifications")
                .header("authorization", format!("Bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json.as_array().unwrap().is_empty());
}
