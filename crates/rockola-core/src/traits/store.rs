// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document store adapter trait for persistence backends.

use async_trait::async_trait;

use crate::error::RockolaError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for keyed JSON document persistence.
///
/// The core persists three documents through this interface: the user
/// account map, the blocklist, and the repetition-ledger export. Documents
/// are written at shutdown and read back at startup; there is no
/// incremental persistence during operation.
#[async_trait]
pub trait DocumentStore: PluginAdapter {
    /// Loads a document by key. Returns `None` when the key has never been saved.
    async fn load(&self, key: &str) -> Result<Option<serde_json::Value>, RockolaError>;

    /// Saves a document under a key, replacing any previous value.
    async fn save(&self, key: &str, doc: &serde_json::Value) -> Result<(), RockolaError>;
}
