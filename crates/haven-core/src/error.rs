// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Haven data layer.

use std::time::Duration;

use thiserror::Error;

use crate::types::Tier;

/// The primary error type used across all Haven adapter traits and the resolver.
///
/// Tier-level variants (`Remote`, `Http`, `StorageUnavailable`, `NotFound`,
/// `Timeout`, `TierDisabled`) are caught by the resolver and turned into a
/// fallthrough. Callers of the resolver only ever see `InvalidKey` in
/// diagnostics and `QueuedNotConfirmed` from writes that demand confirmation.
#[derive(Debug, Error)]
pub enum HavenError {
    /// A resource key could not be constructed (empty user id, bad resource name).
    #[error("invalid resource key: {0}")]
    InvalidKey(String),

    /// Primary tier failure: network, authentication, or backend validation.
    #[error("remote error: {message}")]
    Remote {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Secondary tier failure. `status` is 0 when no HTTP response was received.
    #[error("http error (status {status}): {message}")]
    Http { status: u16, message: String },

    /// The on-device store itself is inaccessible (corrupt, locked, full).
    #[error("local storage unavailable: {source}")]
    StorageUnavailable {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No cached entry exists for the requested key.
    #[error("not found: {0}")]
    NotFound(String),

    /// A write was queued locally because no network tier confirmed it.
    #[error("saved locally as pending mutation {pending_id}, will sync later")]
    QueuedNotConfirmed { pending_id: i64 },

    /// A tier did not answer within its configured deadline.
    #[error("{tier} tier timed out after {duration:?}")]
    Timeout { tier: Tier, duration: Duration },

    /// The tier is not configured (missing URL) and always fails.
    #[error("{0} tier is disabled")]
    TierDisabled(Tier),

    /// Payload (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A value supplied for a write is out of range or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration errors (invalid URL, unusable token).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HavenError {
    /// Shorthand for a primary-tier failure without an underlying source.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps any storage-layer error as [`HavenError::StorageUnavailable`].
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::StorageUnavailable {
            source: Box::new(err),
        }
    }

    /// Returns true for a cache miss as opposed to a broken store.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
