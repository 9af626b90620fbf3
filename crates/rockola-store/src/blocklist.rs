// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent blocklist backed by the document store.
//!
//! The set lives in memory for fast admission checks; every mutation is
//! written through to the store so a restart never forgets a block.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use rockola_core::traits::adapter::PluginAdapter;
use rockola_core::traits::blocklist::Blocklist;
use rockola_core::types::{AdapterType, HealthStatus, UserId};
use rockola_core::{DocumentStore, RockolaError};

const BLOCKLIST_KEY: &str = "blocklist";

/// Write-through blocklist over a [`DocumentStore`].
pub struct StoredBlocklist {
    store: Arc<dyn DocumentStore>,
    blocked: Mutex<BTreeSet<UserId>>,
}

impl StoredBlocklist {
    /// Loads the persisted blocklist, or starts empty if none was saved.
    pub async fn load(store: Arc<dyn DocumentStore>) -> Result<Self, RockolaError> {
        let blocked: BTreeSet<UserId> = match store.load(BLOCKLIST_KEY).await? {
            Some(doc) => serde_json::from_value(doc)
                .map_err(|e| RockolaError::Storage { source: Box::new(e) })?,
            None => BTreeSet::new(),
        };
        info!(count = blocked.len(), "blocklist loaded");
        Ok(Self {
            store,
            blocked: Mutex::new(blocked),
        })
    }

    async fn persist(&self, blocked: &BTreeSet<UserId>) -> Result<(), RockolaError> {
        let doc = serde_json::to_value(blocked)
            .map_err(|e| RockolaError::Storage { source: Box::new(e) })?;
        self.store.save(BLOCKLIST_KEY, &doc).await
    }

    /// Current blocklist contents, for the admin panel.
    pub async fn snapshot(&self) -> Vec<UserId> {
        self.blocked.lock().await.iter().cloned().collect()
    }
}

#[async_trait]
impl PluginAdapter for StoredBlocklist {
    fn name(&self) -> &str {
        "stored-blocklist"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Blocklist
    }

    async fn health_check(&self) -> Result<HealthStatus, RockolaError> {
        self.store.health_check().await
    }

    async fn shutdown(&self) -> Result<(), RockolaError> {
        Ok(())
    }
}

#[async_trait]
impl Blocklist for StoredBlocklist {
    async fn is_blocked(&self, user: &UserId) -> Result<bool, RockolaError> {
        Ok(self.blocked.lock().await.contains(user))
    }

    async fn block(&self, user: &UserId) -> Result<(), RockolaError> {
        let mut blocked = self.blocked.lock().await;
        if blocked.insert(user.clone()) {
            info!(user = %user, "user permanently blocked");
            self.persist(&blocked).await?;
        }
        Ok(())
    }

    async fn unblock(&self, user: &UserId) -> Result<(), RockolaError> {
        let mut blocked = self.blocked.lock().await;
        if blocked.remove(user) {
            info!(user = %user, "user unblocked");
            self.persist(&blocked).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_store::JsonStore;

    async fn store(dir: &std::path::Path) -> Arc<dyn DocumentStore> {
        Arc::new(JsonStore::open(dir).await.unwrap())
    }

    #[tokio::test]
    async fn starts_empty_without_saved_document() {
        let dir = tempfile::tempdir().unwrap();
        let blocklist = StoredBlocklist::load(store(dir.path()).await).await.unwrap();
        assert!(!blocklist.is_blocked(&UserId("u".into())).await.unwrap());
    }

    #[tokio::test]
    async fn blocks_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let user = UserId("5218441".into());

        {
            let blocklist = StoredBlocklist::load(store(dir.path()).await).await.unwrap();
            blocklist.block(&user).await.unwrap();
        }

        let reloaded = StoredBlocklist::load(store(dir.path()).await).await.unwrap();
        assert!(reloaded.is_blocked(&user).await.unwrap());
    }

    #[tokio::test]
    async fn unblock_persists_too() {
        let dir = tempfile::tempdir().unwrap();
        let user = UserId("u".into());

        let blocklist = StoredBlocklist::load(store(dir.path()).await).await.unwrap();
        blocklist.block(&user).await.unwrap();
        blocklist.unblock(&user).await.unwrap();

        let reloaded = StoredBlocklist::load(store(dir.path()).await).await.unwrap();
        assert!(!reloaded.is_blocked(&user).await.unwrap());
        assert!(reloaded.snapshot().await.is_empty());
    }
}
