// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.
//!
//! The webhook bridge (`POST /v1/messages`) feeds inbound transport
//! messages to the request engine and returns the engine's reply for the
//! transport frontend to deliver. The admin routes expose tier profiles,
//! per-user tier overrides, the repetition ledger, pending notifications,
//! and the retention sweep.

use std::str::FromStr;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use rockola_core::types::{GeoPoint, MessageContent};
use rockola_core::{Tier, TrackId, UserId};
use rockola_engine::ledger::CoolingTrack;
use rockola_engine::notify::PendingView;
use rockola_tiers::TierProfile;

use crate::server::GatewayState;

/// Request body for POST /v1/messages.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    /// Sender's subscriber id.
    pub user_id: String,
    /// Message text, for text messages.
    #[serde(default)]
    pub text: Option<String>,
    /// Shared location, for location messages.
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

/// Response body for POST /v1/messages.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Reply the transport should deliver; `null` when the engine chose
    /// silence (duplicate suppression).
    pub reply: Option<String>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn not_found(message: impl Into<String>) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// POST /v1/messages -- the transport webhook bridge.
pub async fn post_messages(
    State(state): State<GatewayState>,
    Json(body): Json<MessageRequest>,
) -> Response {
    let content = match (body.text, body.location) {
        (Some(text), None) => MessageContent::Text(text),
        (None, Some(point)) => MessageContent::Location(point),
        _ => return bad_request("exactly one of `text` or `location` is required"),
    };

    let sender = UserId(body.user_id);
    let reply = state
        .engine
        .handle_message(&sender, &content, chrono::Utc::now())
        .await;

    Json(MessageResponse { reply }).into_response()
}

/// GET /health -- unauthenticated liveness probe.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /v1/tiers -- the whole tier profile table.
pub async fn get_tiers(State(state): State<GatewayState>) -> Response {
    let all = state.engine.tiers().all().await;
    // Keyed by tier name for a stable JSON shape.
    let table: std::collections::BTreeMap<String, TierProfile> = all
        .into_iter()
        .map(|(tier, profile)| (tier.to_string(), profile))
        .collect();
    Json(table).into_response()
}

/// GET /v1/tiers/{tier} -- a single tier profile.
pub async fn get_tier(
    State(state): State<GatewayState>,
    Path(tier): Path<String>,
) -> Response {
    let Ok(tier) = Tier::from_str(&tier) else {
        return not_found(format!("unknown tier `{tier}`"));
    };
    match state.engine.tiers().profile_for(tier).await {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => not_found(e.to_string()),
    }
}

/// PUT /v1/tiers/{tier} -- atomic whole-entry profile replacement.
pub async fn put_tier(
    State(state): State<GatewayState>,
    Path(tier): Path<String>,
    Json(profile): Json<TierProfile>,
) -> Response {
    let Ok(tier) = Tier::from_str(&tier) else {
        return not_found(format!("unknown tier `{tier}`"));
    };
    state.engine.tiers().set_profile(tier, profile).await;
    StatusCode::NO_CONTENT.into_response()
}

/// Request body for PUT /v1/users/{id}/tier.
#[derive(Debug, Deserialize)]
pub struct TierOverrideRequest {
    pub tier: Tier,
}

/// PUT /v1/users/{id}/tier -- per-user tier override.
pub async fn put_user_tier(
    State(state): State<GatewayState>,
    Path(user_id): Path<String>,
    Json(body): Json<TierOverrideRequest>,
) -> Response {
    let user = UserId(user_id);
    if state.engine.accounts().set_tier(&user, body.tier).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(format!("unknown user `{user}`"))
    }
}

/// GET /v1/ledger -- tracks currently inside the repeat window.
pub async fn get_ledger(State(state): State<GatewayState>) -> Json<Vec<CoolingTrack>> {
    Json(state.engine.ledger().cooling_down(chrono::Utc::now()).await)
}

/// Request body for POST /v1/ledger.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerInjectRequest {
    pub track_id: String,
    /// `null` for admin-seeded history.
    #[serde(default)]
    pub requested_by: Option<String>,
}

/// POST /v1/ledger -- manual record injection (admin bypass logging).
pub async fn post_ledger(
    State(state): State<GatewayState>,
    Json(body): Json<LedgerInjectRequest>,
) -> Response {
    state
        .engine
        .ledger()
        .record_play(
            &TrackId(body.track_id),
            body.requested_by.map(UserId),
            chrono::Utc::now(),
        )
        .await;
    StatusCode::NO_CONTENT.into_response()
}

/// GET /v1/notifications -- pending coming-up prompts.
pub async fn get_notifications(State(state): State<GatewayState>) -> Json<Vec<PendingView>> {
    Json(state.engine.notifier().pending_snapshot().await)
}

/// Response body for GET /v1/stats.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Registered subscriber accounts.
    pub accounts: usize,
    /// Records currently held by the repetition ledger.
    pub ledger_entries: usize,
    /// Pending coming-up prompts.
    pub pending_notifications: usize,
    /// Requests currently between admission and enqueue completion, by tier.
    pub in_flight: std::collections::BTreeMap<String, usize>,
}

/// GET /v1/stats -- operational counters for the admin panel.
pub async fn get_stats(State(state): State<GatewayState>) -> Json<StatsResponse> {
    let in_flight = state
        .engine
        .queue()
        .in_flight_counts()
        .await
        .into_iter()
        .map(|(tier, count)| (tier.to_string(), count))
        .collect();
    Json(StatsResponse {
        accounts: state.engine.accounts().len().await,
        ledger_entries: state.engine.ledger().len().await,
        pending_notifications: state.engine.notifier().pending_snapshot().await.len(),
        in_flight,
    })
}

/// Request body for POST /v1/users/retire.
#[derive(Debug, Deserialize)]
pub struct RetireRequest {
    pub max_idle_days: i64,
}

/// Response body for POST /v1/users/retire.
#[derive(Debug, Serialize)]
pub struct RetireResponse {
    pub removed: usize,
}

/// POST /v1/users/retire -- the retention-cleanup sweep.
pub async fn post_retire(
    State(state): State<GatewayState>,
    Json(body): Json<RetireRequest>,
) -> Response {
    if body.max_idle_days <= 0 {
        return bad_request("max_idle_days must be positive");
    }
    let removed = state
        .engine
        .accounts()
        .retire_inactive(chrono::Utc::now(), body.max_idle_days)
        .await;
    Json(RetireResponse { removed }).into_response()
}
