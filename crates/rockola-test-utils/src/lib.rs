// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Rockola: mock implementations of every collaborator
//! adapter, with injectable state and failure modes.

pub mod mock_blocklist;
pub mod mock_catalog;
pub mod mock_filter;
pub mod mock_transport;

pub use mock_blocklist::MockBlocklist;
pub use mock_catalog::MockCatalog;
pub use mock_filter::MockFilter;
pub use mock_transport::MockTransport;
