// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Rockola jukebox bot.
//!
//! Policy denials (quota, cooldown, geofence, content) are NOT errors --
//! they are `Verdict` values returned by the admission controller. This
//! enum covers operational failures from collaborators and programmer
//! errors that are fatal to a single request.

use thiserror::Error;

/// The primary error type used across all Rockola adapter traits and core operations.
#[derive(Debug, Error)]
pub enum RockolaError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistence errors (document load/save failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging transport errors (send failure, connection loss).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Catalog/playback backend errors (search, enqueue, dequeue, snapshot).
    #[error("catalog error: {message}")]
    Catalog {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A tier had no profile in the registry. Programmer/configuration error:
    /// fatal to the request being processed, never silently defaulted.
    #[error("unknown tier: {tier}")]
    UnknownTier { tier: String },

    /// A track reference could not be resolved by the catalog.
    #[error("unknown track: {track}")]
    UnknownTrack { track: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
