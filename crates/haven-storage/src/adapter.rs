// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`LocalCache`] trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use haven_config::model::CacheConfig;
use haven_core::{
    AdapterType, CachedEntry, HavenError, HealthStatus, LocalCache, NewPendingMutation,
    PendingMutation, PluginAdapter, ResourceKey,
};

use crate::database::{map_tr_err, Database};
use crate::queries;

/// SQLite-backed local cache.
///
/// The database is opened lazily by [`SqliteCache::initialize`]. Until then
/// every operation fails with `StorageUnavailable`, which the resolver
/// treats like any other broken store.
pub struct SqliteCache {
    config: CacheConfig,
    db: OnceCell<Database>,
}

impl SqliteCache {
    /// Create a cache for the configured path. Nothing is opened yet.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Create and initialize in one step.
    pub async fn open(config: CacheConfig) -> Result<Self, HavenError> {
        let cache = Self::new(config);
        cache.initialize().await?;
        Ok(cache)
    }

    /// Open the database file and run migrations. Fails if called twice.
    pub async fn initialize(&self) -> Result<(), HavenError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| HavenError::storage(std::io::Error::other("cache already initialized")))?;
        debug!(path = %self.config.database_path, "local cache initialized");
        Ok(())
    }

    fn db(&self) -> Result<&Database, HavenError> {
        self.db.get().ok_or_else(|| {
            HavenError::storage(std::io::Error::other(
                "cache not initialized -- call initialize() first",
            ))
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteCache {
    fn name(&self) -> &str {
        "sqlite-cache"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Cache
    }

    async fn health_check(&self) -> Result<HealthStatus, HavenError> {
        let db = match self.db() {
            Ok(db) => db,
            Err(e) => return Ok(HealthStatus::Unhealthy(e.to_string())),
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("SELECT 1", [], |_| Ok(()))
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), HavenError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl LocalCache for SqliteCache {
    async fn get(&self, key: &ResourceKey) -> Result<CachedEntry, HavenError> {
        queries::entries::get_entry(self.db()?, key).await
    }

    async fn put(&self, key: &ResourceKey, payload: &serde_json::Value) -> Result<(), HavenError> {
        queries::entries::put_entry(self.db()?, key, payload).await
    }

    async fn invalidate(&self, key: &ResourceKey) -> Result<u64, HavenError> {
        queries::entries::invalidate_scope(self.db()?, key).await
    }

    async fn append_pending(&self, mutation: &NewPendingMutation) -> Result<i64, HavenError> {
        queries::pending::append(self.db()?, mutation).await
    }

    async fn pending(&self) -> Result<Vec<PendingMutation>, HavenError> {
        queries::pending::list(self.db()?).await
    }

    async fn clear_pending(&self) -> Result<u64, HavenError> {
        queries::pending::clear(self.db()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn make_config(path: &str) -> CacheConfig {
        CacheConfig {
            database_path: path.to_string(),
            wal_mode: true,
            timeout_ms: 1_000,
        }
    }

    #[tokio::test]
    async fn sqlite_cache_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let cache = SqliteCache::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(cache.name(), "sqlite-cache");
        assert_eq!(cache.version(), semver::Version::new(0, 1, 0));
        assert_eq!(cache.adapter_type(), AdapterType::Cache);
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let cache = SqliteCache::new(make_config(db_path.to_str().unwrap()));

        cache.initialize().await.unwrap();
        assert!(cache.initialize().await.is_err());
    }

    #[tokio::test]
    async fn uninitialized_cache_reports_storage_unavailable() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let cache = SqliteCache::new(make_config(db_path.to_str().unwrap()));
        let key = ResourceKey::new("u1", "moods").unwrap();

        let err = cache.get(&key).await.unwrap_err();
        assert!(matches!(err, HavenError::StorageUnavailable { .. }));
        assert!(matches!(
            cache.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }

    #[tokio::test]
    async fn round_trip_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("round_trip.db");
        let cache = SqliteCache::open(make_config(db_path.to_str().unwrap()))
            .await
            .unwrap();
        let key = ResourceKey::new("u1", "assessments").unwrap();

        cache.put(&key, &json!({"score": 28})).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap().payload, json!({"score": 28}));

        assert_eq!(cache.invalidate(&key).await.unwrap(), 1);
        assert!(cache.get(&key).await.unwrap_err().is_not_found());

        assert_eq!(cache.health_check().await.unwrap(), HealthStatus::Healthy);
        cache.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn pending_queue_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("pending_adapter.db");
        let cache = SqliteCache::open(make_config(db_path.to_str().unwrap()))
            .await
            .unwrap();

        let id = cache
            .append_pending(&NewPendingMutation {
                user_id: "u1".into(),
                resource: "moods".into(),
                function: "moods:logMood".into(),
                payload: json!({"mood": "calm"}),
            })
            .await
            .unwrap();
        assert!(id > 0);

        let pending = cache.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, id);
        assert_eq!(cache.clear_pending().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn entries_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("persist.db");
        let path = db_path.to_str().unwrap();
        let key = ResourceKey::new("u1", "settings").unwrap();

        {
            let cache = SqliteCache::open(make_config(path)).await.unwrap();
            cache.put(&key, &json!({"theme": "dark"})).await.unwrap();
            cache.shutdown().await.unwrap();
        }

        let cache = SqliteCache::open(make_config(path)).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap().payload, json!({"theme": "dark"}));
    }
}
