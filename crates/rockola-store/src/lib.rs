// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence for Rockola: a JSON-file document store and the persistent
//! blocklist built on top of it.
//!
//! Documents are loaded at startup and written at shutdown (plus on
//! blocklist mutation); there is no incremental persistence during normal
//! operation.

pub mod blocklist;
pub mod json_store;

pub use blocklist::StoredBlocklist;
pub use json_store::JsonStore;
