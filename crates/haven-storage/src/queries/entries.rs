// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache entry reads, overwrites, and scope invalidation.

use haven_core::{CachedEntry, HavenError, ResourceKey};
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

/// Fetch the entry stored under `key`.
///
/// A missing row is [`HavenError::NotFound`]. A payload that no longer parses
/// means the store is corrupt and surfaces as `StorageUnavailable`.
pub async fn get_entry(db: &Database, key: &ResourceKey) -> Result<CachedEntry, HavenError> {
    let storage_key = key.storage_key();
    let lookup = storage_key.clone();
    let row = db
        .connection()
        .call(move |conn| -> Result<Option<(String, String)>, rusqlite::Error> {
            conn.query_row(
                "SELECT payload, written_at FROM cache_entries WHERE storage_key = ?1",
                params![lookup],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;

    let (raw, written_at) = row.ok_or_else(|| HavenError::NotFound(storage_key.clone()))?;
    let payload = serde_json::from_str(&raw).map_err(HavenError::storage)?;
    Ok(CachedEntry {
        key: storage_key,
        payload,
        written_at,
    })
}

/// Insert or overwrite the entry for `key`.
pub async fn put_entry(
    db: &Database,
    key: &ResourceKey,
    payload: &serde_json::Value,
) -> Result<(), HavenError> {
    let storage_key = key.storage_key();
    let user_id = key.user_id().to_string();
    let resource = key.resource().to_string();
    let raw = serde_json::to_string(payload)?;

    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO cache_entries (storage_key, user_id, resource, payload)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(storage_key) DO UPDATE SET
                    payload = excluded.payload,
                    written_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![storage_key, user_id, resource, raw],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Delete every variant cached for the key's `(user, resource)` scope.
pub async fn invalidate_scope(db: &Database, key: &ResourceKey) -> Result<u64, HavenError> {
    let user_id = key.user_id().to_string();
    let resource = key.resource().to_string();

    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "DELETE FROM cache_entries WHERE user_id = ?1 AND resource = ?2",
                params![user_id, resource],
            )
        })
        .await
        .map(|n| n as u64)
        .map_err(map_tr_err)
}
