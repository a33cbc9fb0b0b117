// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use haven_core::HavenError;
use tracing::debug;

use crate::migrations;

/// Convert a tokio-rusqlite error into [`HavenError::StorageUnavailable`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> HavenError {
    HavenError::storage(e)
}

/// Handle to the cache database. Owns the single writer connection.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` in WAL mode and migrate it.
    pub async fn open(path: &str) -> Result<Self, HavenError> {
        Self::open_with(path, true).await
    }

    /// Open with an explicit journal mode choice.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, HavenError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(HavenError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(HavenError::storage)?;

        let journal = if wal_mode { "WAL" } else { "DELETE" };
        conn.call(
            move |conn| -> Result<Result<(), refinery::Error>, rusqlite::Error> {
                conn.pragma_update_and_check(None, "journal_mode", journal, |row| {
                    row.get::<_, String>(0)
                })?;
                conn.pragma_update(None, "synchronous", "NORMAL")?;
                conn.busy_timeout(Duration::from_secs(5))?;
                Ok(migrations::run_migrations(conn))
            },
        )
        .await
        .map_err(map_tr_err)?
        .map_err(HavenError::storage)?;

        debug!(path, wal_mode, "cache database opened");
        Ok(Self { conn })
    }

    /// The underlying async connection. Query modules go through `call()`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flush the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), HavenError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Close the connection, waiting for queued calls to finish.
    pub async fn close(self) -> Result<(), HavenError> {
        self.conn.close().await.map_err(HavenError::storage)
    }
}
