// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation row CRUD, expiry sweeps, and table statistics.

use chrono::{DateTime, TimeZone, Utc};
use convo_core::{ConversationRecord, ConvoError};
use rusqlite::{params, OptionalExtension};
use tracing::trace;

use crate::database::{map_tr_err, Database};

/// Which statement an upsert ended up running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertKind {
    Insert,
    Update,
}

impl UpsertKind {
    fn verb(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
        }
    }
}

/// Row counts reported by `convo stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableStats {
    pub total: u64,
    pub expired: u64,
    /// `(type_name, rows)` ordered by type name.
    pub by_type: Vec<(String, u64)>,
}

/// Insert the record, or overwrite the existing `(id, type_name)` row.
///
/// Existence check and write run in one transaction. Anything other than
/// exactly one affected row is reported as a backend failure.
pub async fn upsert(db: &Database, record: &ConversationRecord) -> Result<UpsertKind, ConvoError> {
    let record = record.clone();
    let id = record.id.clone();
    let expires_at = record.expires_at.timestamp_millis();

    let (kind, affected) = db
        .connection()
        .call(move |conn| -> Result<(UpsertKind, usize), rusqlite::Error> {
            let tx = conn.transaction()?;
            let exists = tx
                .query_row(
                    "SELECT 1 FROM conversation_holder WHERE id = ?1 AND type_name = ?2",
                    params![record.id, record.type_name],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();

            let (kind, affected) = if exists {
                let n = tx.execute(
                    "UPDATE conversation_holder
                     SET owner_id = ?3, version = ?4, expires_at = ?5, serialized_value = ?6
                     WHERE id = ?1 AND type_name = ?2",
                    params![
                        record.id,
                        record.type_name,
                        record.owner_id,
                        record.version,
                        expires_at,
                        record.serialized_value,
                    ],
                )?;
                (UpsertKind::Update, n)
            } else {
                let n = tx.execute(
                    "INSERT INTO conversation_holder
                     (id, type_name, owner_id, version, expires_at, serialized_value)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        record.id,
                        record.type_name,
                        record.owner_id,
                        record.version,
                        expires_at,
                        record.serialized_value,
                    ],
                )?;
                (UpsertKind::Insert, n)
            };

            if affected == 1 {
                tx.commit()?;
            }
            Ok((kind, affected))
        })
        .await
        .map_err(map_tr_err)?;

    if affected != 1 {
        return Err(ConvoError::backend(format!(
            "failed to {} conversation `{id}`: {affected} rows affected",
            kind.verb()
        )));
    }
    trace!(id = %id, op = kind.verb(), "conversation row written");
    Ok(kind)
}

/// Fetch a row regardless of expiry.
pub async fn find(
    db: &Database,
    id: &str,
    type_name: &str,
) -> Result<Option<ConversationRecord>, ConvoError> {
    let id = id.to_string();
    let type_name = type_name.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<ConversationRecord>, rusqlite::Error> {
            conn.query_row(
                "SELECT id, type_name, owner_id, version, expires_at, serialized_value
                 FROM conversation_holder WHERE id = ?1 AND type_name = ?2",
                params![id, type_name],
                |row| {
                    Ok(ConversationRecord {
                        id: row.get(0)?,
                        type_name: row.get(1)?,
                        owner_id: row.get(2)?,
                        version: row.get(3)?,
                        expires_at: from_millis(row.get(4)?),
                        serialized_value: row.get(5)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete one row. Returns the number of rows removed (0 or 1).
pub async fn delete(db: &Database, id: &str, type_name: &str) -> Result<usize, ConvoError> {
    let id = id.to_string();
    let type_name = type_name.to_string();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "DELETE FROM conversation_holder WHERE id = ?1 AND type_name = ?2",
                params![id, type_name],
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Delete one row only if it is still expired at `now`.
///
/// A row refreshed by a concurrent upsert after it was read as expired
/// survives. Returns the number of rows removed (0 or 1).
pub async fn delete_if_expired(
    db: &Database,
    id: &str,
    type_name: &str,
    now: DateTime<Utc>,
) -> Result<usize, ConvoError> {
    let id = id.to_string();
    let type_name = type_name.to_string();
    let now = now.timestamp_millis();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "DELETE FROM conversation_holder
                 WHERE id = ?1 AND type_name = ?2 AND expires_at < ?3",
                params![id, type_name, now],
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Delete at most `limit` rows whose expiry is strictly before `now`.
pub async fn delete_expired_batch(
    db: &Database,
    now: DateTime<Utc>,
    limit: u32,
) -> Result<usize, ConvoError> {
    let now = now.timestamp_millis();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "DELETE FROM conversation_holder WHERE rowid IN (
                     SELECT rowid FROM conversation_holder WHERE expires_at < ?1 LIMIT ?2
                 )",
                params![now, limit],
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn stats(db: &Database, now: DateTime<Utc>) -> Result<TableStats, ConvoError> {
    let now = now.timestamp_millis();
    db.connection()
        .call(move |conn| -> Result<TableStats, rusqlite::Error> {
            let (total, expired): (i64, i64) = conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(expires_at < ?1), 0) FROM conversation_holder",
                params![now],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            let mut stmt = conn.prepare(
                "SELECT type_name, COUNT(*) FROM conversation_holder
                 GROUP BY type_name ORDER BY type_name",
            )?;
            let by_type = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(TableStats {
                total: total as u64,
                expired: expired as u64,
                by_type,
            })
        })
        .await
        .map_err(map_tr_err)
}

fn from_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
