// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local cache trait for on-device persistence.

use async_trait::async_trait;

use crate::error::HavenError;
use crate::key::ResourceKey;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CachedEntry, NewPendingMutation, PendingMutation};

/// On-device key/value store used as the last tier before the default.
///
/// Implementations return [`HavenError::NotFound`] for a miss and reserve
/// [`HavenError::StorageUnavailable`] for a broken store.
#[async_trait]
pub trait LocalCache: PluginAdapter {
    /// Returns the most recently written payload for `key`.
    async fn get(&self, key: &ResourceKey) -> Result<CachedEntry, HavenError>;

    /// Overwrites the entry for `key` unconditionally.
    async fn put(&self, key: &ResourceKey, payload: &serde_json::Value) -> Result<(), HavenError>;

    /// Deletes every param variant cached for the key's `(user, resource)` scope.
    ///
    /// Returns the number of entries removed.
    async fn invalidate(&self, key: &ResourceKey) -> Result<u64, HavenError>;

    /// Appends a mutation to the pending queue. Returns its id.
    async fn append_pending(&self, mutation: &NewPendingMutation) -> Result<i64, HavenError>;

    /// Lists pending mutations in the order they were appended.
    async fn pending(&self) -> Result<Vec<PendingMutation>, HavenError>;

    /// Explicitly empties the pending queue. Returns the number removed.
    async fn clear_pending(&self) -> Result<u64, HavenError>;
}
