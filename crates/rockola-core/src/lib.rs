// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Rockola jukebox bot.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Rockola workspace. All collaborator
//! adapters (transport, catalog, content filter, blocklist, document store)
//! implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RockolaError;
pub use types::{
    AdapterType, GeoPoint, HealthStatus, MessageContent, MessageId, Tier, Track, TrackId, UserId,
};

// Re-export all adapter traits at crate root.
pub use traits::{
    Blocklist, Catalog, ContentFilter, DocumentStore, GeofenceCheck, PluginAdapter, Transport,
};
