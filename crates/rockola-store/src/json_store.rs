// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON file document store.
//!
//! Each key maps to `<data_dir>/<key>.json`. Writes go through a temp file
//! and an atomic rename, so a crash mid-write never corrupts the previous
//! snapshot. Documents are whole-value replacements; there is no merging.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use rockola_core::traits::adapter::PluginAdapter;
use rockola_core::traits::store::DocumentStore;
use rockola_core::types::{AdapterType, HealthStatus};
use rockola_core::RockolaError;

/// Directory-backed JSON document store.
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, RockolaError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| RockolaError::Storage { source: Box::new(e) })?;
        info!(dir = %dir.display(), "json store opened");
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are internal identifiers (accounts, blocklist, ledger), not
        // user input; still, keep them to a single path component.
        debug_assert!(!key.contains('/') && !key.contains('\\'));
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl PluginAdapter for JsonStore {
    fn name(&self) -> &str {
        "json-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, RockolaError> {
        match tokio::fs::metadata(&self.dir).await {
            Ok(meta) if meta.is_dir() => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Unhealthy("data path is not a directory".into())),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), RockolaError> {
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonStore {
    async fn load(&self, key: &str) -> Result<Option<serde_json::Value>, RockolaError> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RockolaError::Storage { source: Box::new(e) }),
        };
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| RockolaError::Storage { source: Box::new(e) })?;
        debug!(key, "document loaded");
        Ok(Some(value))
    }

    async fn save(&self, key: &str, doc: &serde_json::Value) -> Result<(), RockolaError> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));

        let bytes = serde_json::to_vec_pretty(doc)
            .map_err(|e| RockolaError::Storage { source: Box::new(e) })?;

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| RockolaError::Storage { source: Box::new(e) })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| RockolaError::Storage { source: Box::new(e) })?;

        debug!(key, bytes = bytes.len(), "document saved");
        Ok(())
    }
}
