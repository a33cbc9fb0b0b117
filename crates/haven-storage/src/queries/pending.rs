// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending-mutation queue. Append-only; nothing here replays entries.

use haven_core::{HavenError, NewPendingMutation, PendingMutation};
use rusqlite::params;

use crate::database::{map_tr_err, Database};

/// Append a mutation. Returns the auto-generated id.
pub async fn append(db: &Database, mutation: &NewPendingMutation) -> Result<i64, HavenError> {
    let user_id = mutation.user_id.clone();
    let resource = mutation.resource.clone();
    let function = mutation.function.clone();
    let payload = serde_json::to_string(&mutation.payload)?;

    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO pending_mutations (user_id, resource, function, payload)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, resource, function, payload],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// All pending mutations, oldest first.
pub async fn list(db: &Database) -> Result<Vec<PendingMutation>, HavenError> {
    let rows = db
        .connection()
        .call(
            |conn| -> Result<Vec<(i64, String, String, String, String, String)>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, user_id, resource, function, payload, created_at
                     FROM pending_mutations ORDER BY id ASC",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                })?;
                rows.collect()
            },
        )
        .await
        .map_err(map_tr_err)?;

    rows.into_iter()
        .map(|(id, user_id, resource, function, raw, created_at)| {
            Ok(PendingMutation {
                id,
                user_id,
                resource,
                function,
                payload: serde_json::from_str(&raw).map_err(HavenError::storage)?,
                created_at,
            })
        })
        .collect()
}

/// Remove every pending mutation. Returns how many were removed.
pub async fn clear(db: &Database) -> Result<u64, HavenError> {
    db.connection()
        .call(|conn| -> Result<usize, rusqlite::Error> {
            conn.execute("DELETE FROM pending_mutations", [])
        })
        .await
        .map(|n| n as u64)
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("pending.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn mutation(payload: serde_json::Value) -> NewPendingMutation {
        NewPendingMutation {
            user_id: "u1".into(),
            resource: "assessments".into(),
            function: "assessments:submitAssessment".into(),
            payload,
        }
    }

    #[tokio::test]
    async fn appended_mutations_keep_call_order() {
        let (db, _dir) = setup_db().await;

        let first = append(&db, &mutation(json!({"type": "assessment", "totalScore": 12})))
            .await
            .unwrap();
        let second = append(&db, &mutation(json!({"type": "assessment", "totalScore": 35})))
            .await
            .unwrap();
        assert!(second > first);

        let queue = list(&db).await.unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].payload, json!({"type": "assessment", "totalScore": 12}));
        assert_eq!(queue[1].payload, json!({"type": "assessment", "totalScore": 35}));
        assert_eq!(queue[1].function, "assessments:submitAssessment");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn clear_empties_queue() {
        let (db, _dir) = setup_db().await;
        append(&db, &mutation(json!(1))).await.unwrap();
        append(&db, &mutation(json!(2))).await.unwrap();

        assert_eq!(clear(&db).await.unwrap(), 2);
        assert!(list(&db).await.unwrap().is_empty());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_appends_all_land() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("concurrent.db");
        let db = std::sync::Arc::new(Database::open(db_path.to_str().unwrap()).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..10 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                append(&db, &mutation(json!({ "n": i }))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(list(&db).await.unwrap().len(), 10);
    }
}
