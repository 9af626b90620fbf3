// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock in-memory blocklist.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rockola_core::traits::adapter::PluginAdapter;
use rockola_core::traits::blocklist::Blocklist;
use rockola_core::types::{AdapterType, HealthStatus, UserId};
use rockola_core::RockolaError;

/// A purely in-memory blocklist.
pub struct MockBlocklist {
    blocked: Arc<Mutex<BTreeSet<UserId>>>,
}

impl MockBlocklist {
    pub fn new() -> Self {
        Self {
            blocked: Arc::new(Mutex::new(BTreeSet::new())),
        }
    }

    pub async fn blocked_users(&self) -> Vec<UserId> {
        self.blocked.lock().await.iter().cloned().collect()
    }
}

impl Default for MockBlocklist {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockBlocklist {
    fn name(&self) -> &str {
        "mock-blocklist"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Blocklist
    }

    async fn health_check(&self) -> Result<HealthStatus, RockolaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RockolaError> {
        Ok(())
    }
}

#[async_trait]
impl Blocklist for MockBlocklist {
    async fn is_blocked(&self, user: &UserId) -> Result<bool, RockolaError> {
        Ok(self.blocked.lock().await.contains(user))
    }

    async fn block(&self, user: &UserId) -> Result<(), RockolaError> {
        self.blocked.lock().await.insert(user.clone());
        Ok(())
    }

    async fn unblock(&self, user: &UserId) -> Result<(), RockolaError> {
        self.blocked.lock().await.remove(user);
        Ok(())
    }
}
