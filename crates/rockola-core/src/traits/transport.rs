// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport adapter trait for the messaging platform integration.

use async_trait::async_trait;

use crate::error::RockolaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MessageId, UserId};

/// Adapter for the outbound half of the messaging channel.
///
/// Inbound messages arrive through the gateway webhook; the core only needs
/// to push proactive messages (coming-up notifications) back out. Delivery
/// retries are the transport's concern -- the core treats `send_message` as
/// fire-and-forget.
#[async_trait]
pub trait Transport: PluginAdapter {
    /// Sends a text message to the given subscriber.
    async fn send_message(&self, to: &UserId, text: &str) -> Result<MessageId, RockolaError>;
}
