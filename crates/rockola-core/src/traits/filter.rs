// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content filter adapter trait.

use async_trait::async_trait;

use crate::error::RockolaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::FilterVerdict;

/// Adapter for the profanity/content filter.
///
/// The filter inspects raw request text and returns an allow/deny verdict
/// with a severity and a recommended account action. The admission
/// controller reports the recommendation; it never applies it itself.
#[async_trait]
pub trait ContentFilter: PluginAdapter {
    /// Evaluates a piece of request text.
    async fn evaluate(&self, text: &str) -> Result<FilterVerdict, RockolaError>;
}
