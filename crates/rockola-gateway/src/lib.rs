// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Rockola.
//!
//! Two surfaces share one axum server:
//! - the **webhook bridge**: the WhatsApp transport frontend POSTs inbound
//!   messages to `/v1/messages` and delivers whatever reply comes back;
//! - the **admin panel API**: bearer-authenticated routes for tier
//!   profiles, per-user tier overrides, the repetition ledger, pending
//!   notifications, and the retention sweep.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{build_router, start_server, GatewayState, ServerConfig};
