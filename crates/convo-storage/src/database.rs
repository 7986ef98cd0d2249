// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection lifecycle: open, PRAGMA setup, migrations, close.
//!
//! Every statement runs on tokio-rusqlite's single background thread, which
//! serializes writers. Do not open a second connection for writes.

use std::path::Path;

use convo_core::ConvoError;
use tracing::debug;

use crate::migrations::run_migrations;

/// Connection options applied on open.
#[derive(Debug, Clone, Copy)]
pub struct OpenOptions {
    pub wal_mode: bool,
    pub busy_timeout_ms: u64,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            wal_mode: true,
            busy_timeout_ms: 5_000,
        }
    }
}

impl From<&convo_config::SqliteConfig> for OpenOptions {
    fn from(config: &convo_config::SqliteConfig) -> Self {
        Self {
            wal_mode: config.wal_mode,
            busy_timeout_ms: config.busy_timeout_ms,
        }
    }
}

/// Handle to the migrated conversation database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` with default options.
    pub async fn open(path: &str) -> Result<Self, ConvoError> {
        Self::open_with(path, OpenOptions::default()).await
    }

    /// Open the database at `path`, creating parent directories first.
    pub async fn open_with(path: &str, options: OpenOptions) -> Result<Self, ConvoError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConvoError::Backend {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| ConvoError::Backend {
                source: Box::new(e),
            })?;
        let db = Self::prepare(conn, options).await?;
        debug!(path, wal = options.wal_mode, "conversation database opened");
        Ok(db)
    }

    /// Private in-memory database, mostly for tests.
    pub async fn open_in_memory() -> Result<Self, ConvoError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| ConvoError::Backend {
                source: Box::new(e),
            })?;
        Self::prepare(
            conn,
            OpenOptions {
                wal_mode: false,
                ..OpenOptions::default()
            },
        )
        .await
    }

    async fn prepare(
        conn: tokio_rusqlite::Connection,
        options: OpenOptions,
    ) -> Result<Self, ConvoError> {
        let OpenOptions {
            wal_mode,
            busy_timeout_ms,
        } = options;

        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                // journal_mode returns the resulting mode as a row.
                let _mode: String =
                    conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
            }
            conn.execute_batch(&format!(
                "PRAGMA busy_timeout = {busy_timeout_ms};
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;"
            ))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| -> Result<Result<(), ConvoError>, rusqlite::Error> {
            Ok(run_migrations(conn))
        })
        .await
        .map_err(map_tr_err)??;

        Ok(Self { conn })
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), ConvoError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn
            .close()
            .await
            .map_err(|e| ConvoError::backend(format!("failed to close database: {e}")))?;
        debug!("conversation database closed");
        Ok(())
    }
}

/// Convert a tokio-rusqlite error into [`ConvoError::Backend`].
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ConvoError {
    ConvoError::Backend {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_creates_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/convo.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();

        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE name = 'conversation_holder'",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("convo.db");
        let path = path.to_str().unwrap();

        Database::open(path).await.unwrap().close().await.unwrap();
        Database::open(path).await.unwrap().close().await.unwrap();
    }

    #[tokio::test]
    async fn wal_mode_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wal.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();

        let mode: String = db
            .connection()
            .call(|conn| -> Result<String, rusqlite::Error> {
                conn.query_row("PRAGMA journal_mode;", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }
}
