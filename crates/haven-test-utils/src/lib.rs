// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Haven.
//!
//! In-process stand-ins for every tier so resolver and service tests run
//! without a network or a database file:
//! - [`MockPrimary`]: scripted document database with live-query support.
//! - [`MockSecondary`]: scripted REST backend.
//! - [`MemoryCache`]: in-memory cache and pending queue with failure switches.

pub mod memory_cache;
pub mod mock_primary;
pub mod mock_secondary;

pub use memory_cache::MemoryCache;
pub use mock_primary::{CallKind, MockPrimary, RecordedCall};
pub use mock_secondary::{MockSecondary, RecordedRequest};

use serde_json::Value;

/// What a scripted tier does when called.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer with this payload.
    Value(Value),
    /// Fail with this message.
    Fail(String),
    /// Never answer. Used to exercise tier timeouts.
    Hang,
}

impl Reply {
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }
}
