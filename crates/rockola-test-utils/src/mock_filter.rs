// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock content filter with a programmable verdict.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rockola_core::traits::adapter::PluginAdapter;
use rockola_core::traits::filter::ContentFilter;
use rockola_core::types::{AdapterType, FilterVerdict, HealthStatus};
use rockola_core::RockolaError;

/// A content filter that returns whatever verdict it was last given.
/// Defaults to allowing everything.
pub struct MockFilter {
    verdict: Arc<Mutex<FilterVerdict>>,
}

impl MockFilter {
    pub fn new() -> Self {
        Self {
            verdict: Arc::new(Mutex::new(FilterVerdict::allow())),
        }
    }

    /// Sets the verdict returned by every subsequent `evaluate` call.
    pub async fn set_verdict(&self, verdict: FilterVerdict) {
        *self.verdict.lock().await = verdict;
    }
}

impl Default for MockFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockFilter {
    fn name(&self) -> &str {
        "mock-filter"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ContentFilter
    }

    async fn health_check(&self) -> Result<HealthStatus, RockolaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RockolaError> {
        Ok(())
    }
}

#[async_trait]
impl ContentFilter for MockFilter {
    async fn evaluate(&self, _text: &str) -> Result<FilterVerdict, RockolaError> {
        Ok(self.verdict.lock().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rockola_core::types::{FilterAction, Severity};

    #[tokio::test]
    async fn defaults_to_allow() {
        let filter = MockFilter::new();
        let verdict = filter.evaluate("anything").await.unwrap();
        assert!(verdict.allowed);
    }

    #[tokio::test]
    async fn programmed_verdict_is_returned() {
        let filter = MockFilter::new();
        filter
            .set_verdict(FilterVerdict {
                allowed: false,
                categories: vec!["spam".into()],
                severity: Severity::Medium,
                recommended_action: FilterAction::TempBlock,
            })
            .await;

        let verdict = filter.evaluate("whatever").await.unwrap();
        assert!(!verdict.allowed);
        assert_eq!(verdict.recommended_action, FilterAction::TempBlock);
    }
}
