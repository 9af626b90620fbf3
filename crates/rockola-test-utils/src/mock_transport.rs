// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport adapter for deterministic testing.
//!
//! Captures every outbound message for assertion; optionally fails sends
//! to exercise error paths.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rockola_core::traits::adapter::PluginAdapter;
use rockola_core::traits::transport::Transport;
use rockola_core::types::{AdapterType, HealthStatus, MessageId, UserId};
use rockola_core::RockolaError;

/// A mock messaging transport that records sent messages.
pub struct MockTransport {
    sent: Arc<Mutex<Vec<(UserId, String)>>>,
    fail_next: Arc<Mutex<bool>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_next: Arc::new(Mutex::new(false)),
        }
    }

    /// All messages passed to `send_message`, in send order.
    pub async fn sent_messages(&self) -> Vec<(UserId, String)> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    /// Makes the next `send_message` call fail.
    pub async fn fail_next_send(&self) {
        *self.fail_next.lock().await = true;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, RockolaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RockolaError> {
        Ok(())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_message(&self, to: &UserId, text: &str) -> Result<MessageId, RockolaError> {
        if std::mem::take(&mut *self.fail_next.lock().await) {
            return Err(RockolaError::Transport {
                message: "injected send failure".into(),
                source: None,
            });
        }
        self.sent.lock().await.push((to.clone(), text.to_string()));
        Ok(MessageId(format!("mock-msg-{}", uuid::Uuid::new_v4())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_captures_outbound_messages() {
        let transport = MockTransport::new();
        let id = transport
            .send_message(&UserId("u1".into()), "hello")
            .await
            .unwrap();
        assert!(id.0.starts_with("mock-msg-"));

        let sent = transport.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, UserId("u1".into()));
        assert_eq!(sent[0].1, "hello");
    }

    #[tokio::test]
    async fn injected_failure_affects_one_send() {
        let transport = MockTransport::new();
        transport.fail_next_send().await;
        assert!(transport.send_message(&UserId("u".into()), "x").await.is_err());
        assert!(transport.send_message(&UserId("u".into()), "y").await.is_ok());
        assert_eq!(transport.sent_count().await, 1);
    }
}
