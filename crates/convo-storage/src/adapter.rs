// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of [`ConversationBackend`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use convo_config::SqliteConfig;
use convo_core::{BackendKind, ConversationBackend, ConversationRecord, ConvoError, HealthStatus};

use crate::database::{map_tr_err, Database, OpenOptions};
use crate::queries;
use crate::queries::conversations::TableStats;
use crate::sweeper::CleanupTarget;

/// Conversations stored in the `conversation_holder` table.
///
/// Expired rows stay on disk until they are read (and removed) or swept by a
/// [`CleanupSweeper`](crate::CleanupSweeper).
pub struct SqliteConversationStore {
    db: Database,
    batch_size: u32,
}

impl SqliteConversationStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            batch_size: convo_config::CleanupConfig::default().batch_size,
        }
    }

    /// Open the configured database file and run migrations.
    pub async fn open(config: &SqliteConfig) -> Result<Self, ConvoError> {
        let db = Database::open_with(&config.database_path, OpenOptions::from(config)).await?;
        debug!(path = %config.database_path, "SQLite conversation store ready");
        Ok(Self::new(db).with_batch_size(config.cleanup.batch_size))
    }

    /// Maximum rows removed per DELETE during a sweep.
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn stats(&self) -> Result<TableStats, ConvoError> {
        queries::conversations::stats(&self.db, Utc::now()).await
    }

    /// Remove every row that expired before `now`, one batch at a time.
    pub async fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<usize, ConvoError> {
        let mut removed = 0;
        loop {
            let n =
                queries::conversations::delete_expired_batch(&self.db, now, self.batch_size).await?;
            removed += n;
            if n < self.batch_size as usize {
                return Ok(removed);
            }
        }
    }

    pub async fn close(self) -> Result<(), ConvoError> {
        self.db.close().await
    }
}

#[async_trait]
impl ConversationBackend for SqliteConversationStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Relational
    }

    async fn health_check(&self) -> Result<HealthStatus, ConvoError> {
        let probe = self
            .db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1 FROM conversation_holder LIMIT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err);
        Ok(match probe {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn save(&self, record: &ConversationRecord) -> Result<(), ConvoError> {
        queries::conversations::upsert(&self.db, record).await?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &str,
        type_name: &str,
    ) -> Result<Option<ConversationRecord>, ConvoError> {
        debug!(id, type_name, "find conversation");
        let Some(record) = queries::conversations::find(&self.db, id, type_name).await? else {
            debug!(id, "conversation not found");
            return Ok(None);
        };

        let now = Utc::now();
        if record.is_expired_at(now) {
            queries::conversations::delete_if_expired(&self.db, id, type_name, now).await?;
            debug!(id, "conversation expired");
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn delete(&self, id: &str, type_name: &str) -> Result<(), ConvoError> {
        debug!(id, type_name, "deleting conversation");
        queries::conversations::delete(&self.db, id, type_name).await?;
        Ok(())
    }
}

#[async_trait]
impl CleanupTarget for SqliteConversationStore {
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, ConvoError> {
        self.delete_expired_before(now).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    fn record(id: &str, expires_in: TimeDelta) -> ConversationRecord {
        ConversationRecord {
            id: id.to_string(),
            type_name: "Checkout".to_string(),
            owner_id: None,
            version: None,
            expires_at: Utc::now() + expires_in,
            serialized_value: "{}".to_string(),
        }
    }

    async fn store() -> SqliteConversationStore {
        SqliteConversationStore::new(Database::open_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn identifies_as_relational() {
        let s = store().await;
        assert_eq!(s.name(), "sqlite");
        assert_eq!(s.kind(), BackendKind::Relational);
        assert_eq!(s.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn expired_row_is_invisible_and_removed() {
        let s = store().await;
        s.save(&record("gone", TimeDelta::seconds(-1))).await.unwrap();

        assert!(s.find_by_id("gone", "Checkout").await.unwrap().is_none());
        // The lazy delete already removed it, so the raw row is gone too.
        assert!(queries::conversations::find(s.database(), "gone", "Checkout")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_expired_loops_over_batches() {
        let s = store().await.with_batch_size(2);
        for i in 0..7 {
            s.save(&record(&format!("e{i}"), TimeDelta::seconds(-5)))
                .await
                .unwrap();
        }
        s.save(&record("live", TimeDelta::minutes(5))).await.unwrap();

        assert_eq!(s.delete_expired_before(Utc::now()).await.unwrap(), 7);
        let stats = s.stats().await.unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.expired, 0);
    }

    #[tokio::test]
    async fn delete_of_missing_row_is_ok() {
        let s = store().await;
        s.delete("missing", "Checkout").await.unwrap();
    }
}
