// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Song-request admission and queue-priority engine.
//!
//! The heart of Rockola: per-tier quota and cooldown enforcement, geofence
//! admission control, the anti-repetition window over the shared playlist,
//! priority-based playlist insertion, and proactive coming-up notifications
//! with tier-aware cancellation.
//!
//! All shared state (accounts, repetition ledger, notification maps) lives
//! in explicitly constructed stores that are injected at startup; nothing
//! is a process-wide singleton. Time-dependent operations take `now` as a
//! parameter so tests simulate time passage deterministically.

pub mod accounts;
pub mod admission;
pub mod engine;
pub mod geo;
pub mod ledger;
pub mod notify;
pub mod queue;
pub mod replies;
pub mod security;

pub use accounts::{AccountStore, UserAccount};
pub use admission::{evaluate, AdmissionInput, DenyReason, Verdict};
pub use engine::RequestEngine;
pub use geo::HaversineGeofence;
pub use ledger::{CooldownStatus, LedgerEntry, RepetitionLedger, REPEAT_WINDOW_MINUTES};
pub use notify::{NotificationScheduler, NOTIFY_QUEUE_INDEX, RESPONSE_WINDOW_MINUTES};
pub use queue::{EnqueueResult, Eta, PlazaBounds, QueuePriorityEngine, RequestOutcome};
pub use security::{ScreenOutcome, SecurityLimits, SecurityScreen};
