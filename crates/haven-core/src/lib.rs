// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Haven data layer.
//!
//! This crate provides the error taxonomy, resource addressing, and the adapter
//! traits every tier implements: the reactive document database (primary), the
//! REST backend (secondary), and the on-device cache.

pub mod error;
pub mod key;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::HavenError;
pub use key::ResourceKey;
pub use types::{
    AdapterType, CachedEntry, CommitOutcome, FetchAttempt, FunctionRef, HealthStatus, HttpMethod,
    NewPendingMutation, PendingMutation, Tier, TierFailure,
};

// Re-export all adapter traits at crate root.
pub use traits::{
    LocalCache, PayloadStream, PluginAdapter, PrimaryService, SecondaryService, Subscription,
};
