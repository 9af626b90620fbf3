// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. The webhook bridge and
//! the health probe are public; every admin route sits behind the bearer
//! auth middleware.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;

use rockola_core::RockolaError;
use rockola_engine::RequestEngine;

use crate::auth::{auth_middleware, AuthConfig};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The request engine and its injected stores.
    pub engine: Arc<RequestEngine>,
    /// Authentication configuration for admin routes.
    pub auth: AuthConfig,
    /// Process start time for uptime reporting.
    pub start_time: Instant,
}

/// Gateway server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Builds the gateway router. Public for tests; `start_server` binds it.
pub fn build_router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    // Public routes: the transport webhook and the liveness probe.
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/messages", post(handlers::post_messages))
        .with_state(state.clone());

    // Admin panel routes, all behind bearer auth.
    let admin_routes = Router::new()
        .route("/v1/tiers", get(handlers::get_tiers))
        .route("/v1/tiers/{tier}", get(handlers::get_tier).put(handlers::put_tier))
        .route("/v1/users/{id}/tier", put(handlers::put_user_tier))
        .route("/v1/users/retire", post(handlers::post_retire))
        .route("/v1/ledger", get(handlers::get_ledger).post(handlers::post_ledger))
        .route("/v1/notifications", get(handlers::get_notifications))
        .route("/v1/stats", get(handlers::get_stats))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server and serve until the process exits.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), RockolaError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RockolaError::Transport {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| RockolaError::Transport {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
