// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blocklist adapter trait for permanently excluded subscribers.

use async_trait::async_trait;

use crate::error::RockolaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::UserId;

/// Adapter for the permanent blocklist.
///
/// A blocked subscriber is rejected before any other admission check runs,
/// so a blocked user never learns their quota or cooldown status.
#[async_trait]
pub trait Blocklist: PluginAdapter {
    /// Returns whether the subscriber is permanently blocked.
    async fn is_blocked(&self, user: &UserId) -> Result<bool, RockolaError>;

    /// Adds a subscriber to the blocklist.
    async fn block(&self, user: &UserId) -> Result<(), RockolaError>;

    /// Removes a subscriber from the blocklist.
    async fn unblock(&self, user: &UserId) -> Result<(), RockolaError>;
}
