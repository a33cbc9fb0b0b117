// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory local cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use haven_core::{
    AdapterType, CachedEntry, HavenError, HealthStatus, LocalCache, NewPendingMutation,
    PendingMutation, PluginAdapter, ResourceKey,
};

#[derive(Debug, Clone)]
struct Stored {
    user_id: String,
    resource: String,
    entry: CachedEntry,
}

#[derive(Default)]
struct Switches {
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_pending: AtomicBool,
    hang: AtomicBool,
}

/// A [`LocalCache`] backed by a `HashMap`, with failure switches.
///
/// Clones share state, so a test can keep one handle for assertions while
/// the resolver owns another.
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, Stored>>>,
    pending: Arc<Mutex<Vec<PendingMutation>>>,
    switches: Arc<Switches>,
    puts: Arc<AtomicUsize>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `get` fails with `StorageUnavailable`.
    pub fn fail_reads(&self, on: bool) {
        self.switches.fail_reads.store(on, Ordering::SeqCst);
    }

    /// `put` and `invalidate` fail with `StorageUnavailable`.
    pub fn fail_writes(&self, on: bool) {
        self.switches.fail_writes.store(on, Ordering::SeqCst);
    }

    /// `append_pending` fails with `StorageUnavailable`.
    pub fn fail_pending(&self, on: bool) {
        self.switches.fail_pending.store(on, Ordering::SeqCst);
    }

    /// Every operation waits forever.
    pub fn hang(&self, on: bool) {
        self.switches.hang.store(on, Ordering::SeqCst);
    }

    /// Successful `put` calls so far.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Seeds an entry without counting it as a write-through.
    pub async fn seed(&self, key: &ResourceKey, payload: Value) {
        self.store(key, payload).await;
    }

    /// Raw payload under `key`, bypassing the failure switches.
    pub async fn peek(&self, key: &ResourceKey) -> Option<Value> {
        self.entries
            .lock()
            .await
            .get(&key.storage_key())
            .map(|s| s.entry.payload.clone())
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    async fn store(&self, key: &ResourceKey, payload: Value) {
        let storage_key = key.storage_key();
        self.entries.lock().await.insert(
            storage_key.clone(),
            Stored {
                user_id: key.user_id().to_string(),
                resource: key.resource().to_string(),
                entry: CachedEntry {
                    key: storage_key,
                    payload,
                    written_at: chrono::Utc::now().to_rfc3339(),
                },
            },
        );
    }

    async fn gate(&self, switch: &AtomicBool) -> Result<(), HavenError> {
        if self.switches.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if switch.load(Ordering::SeqCst) {
            return Err(HavenError::storage(std::io::Error::other(
                "simulated storage failure",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for MemoryCache {
    fn name(&self) -> &str {
        "memory-cache"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Cache
    }

    async fn health_check(&self) -> Result<HealthStatus, HavenError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), HavenError> {
        Ok(())
    }
}

#[async_trait]
impl LocalCache for MemoryCache {
    async fn get(&self, key: &ResourceKey) -> Result<CachedEntry, HavenError> {
        self.gate(&self.switches.fail_reads).await?;
        self.entries
            .lock()
            .await
            .get(&key.storage_key())
            .map(|s| s.entry.clone())
            .ok_or_else(|| HavenError::NotFound(key.storage_key()))
    }

    async fn put(&self, key: &ResourceKey, payload: &Value) -> Result<(), HavenError> {
        self.gate(&self.switches.fail_writes).await?;
        self.store(key, payload.clone()).await;
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn invalidate(&self, key: &ResourceKey) -> Result<u64, HavenError> {
        self.gate(&self.switches.fail_writes).await?;
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, s| !(s.user_id == key.user_id() && s.resource == key.resource()));
        Ok((before - entries.len()) as u64)
    }

    async fn append_pending(&self, mutation: &NewPendingMutation) -> Result<i64, HavenError> {
        self.gate(&self.switches.fail_pending).await?;
        let mut pending = self.pending.lock().await;
        let id = pending.last().map_or(1, |m| m.id + 1);
        pending.push(PendingMutation {
            id,
            user_id: mutation.user_id.clone(),
            resource: mutation.resource.clone(),
            function: mutation.function.clone(),
            payload: mutation.payload.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        });
        Ok(id)
    }

    async fn pending(&self) -> Result<Vec<PendingMutation>, HavenError> {
        self.gate(&self.switches.fail_reads).await?;
        Ok(self.pending.lock().await.clone())
    }

    async fn clear_pending(&self) -> Result<u64, HavenError> {
        self.gate(&self.switches.fail_pending).await?;
        let mut pending = self.pending.lock().await;
        let n = pending.len() as u64;
        pending.clear();
        Ok(n)
    }
}
