// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend harness for integration tests.
//!
//! `TestBackends` owns either a SQLite store in a temp directory or an
//! in-process key-value store, and exposes raw record hooks (version and
//! payload tampering, row counts, sweeps) that the public API does not offer.

use std::sync::Arc;

use convo_config::SqliteConfig;
use convo_core::{ConversationBackend, ConversationRecord, ConvoError};
use convo_kv::KeyValueConversationStore;
use convo_storage::{CleanupSweeper, SqliteConversationStore};

pub struct TestBackends {
    backend: Arc<dyn ConversationBackend>,
    sqlite: Option<Arc<SqliteConversationStore>>,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestBackends {
    /// SQLite store backed by a file in a fresh temp directory.
    pub async fn sqlite() -> Result<Self, ConvoError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| ConvoError::Backend {
            source: Box::new(e),
        })?;
        let config = SqliteConfig {
            database_path: temp_dir.path().join("convo-test.db").display().to_string(),
            ..SqliteConfig::default()
        };
        let store = Arc::new(SqliteConversationStore::open(&config).await?);
        Ok(Self {
            backend: store.clone(),
            sqlite: Some(store),
            _temp_dir: Some(temp_dir),
        })
    }

    /// In-process key-value store.
    pub fn memory() -> Self {
        Self {
            backend: Arc::new(KeyValueConversationStore::in_memory()),
            sqlite: None,
            _temp_dir: None,
        }
    }

    pub fn backend(&self) -> Arc<dyn ConversationBackend> {
        Arc::clone(&self.backend)
    }

    pub fn sqlite_store(&self) -> Option<&Arc<SqliteConversationStore>> {
        self.sqlite.as_ref()
    }

    /// Read the live record `(id, type_name)`, apply `edit` and write it back
    /// unchanged otherwise (expiry included). Returns `false` when no live
    /// record exists. Works on every strategy.
    pub async fn rewrite_record(
        &self,
        id: &str,
        type_name: &str,
        edit: impl FnOnce(&mut ConversationRecord),
    ) -> Result<bool, ConvoError> {
        let Some(mut record) = self.backend.find_by_id(id, type_name).await? else {
            return Ok(false);
        };
        edit(&mut record);
        self.backend.save(&record).await?;
        Ok(true)
    }

    /// Overwrite the stored schema version of one record.
    pub async fn set_stored_version(
        &self,
        id: &str,
        type_name: &str,
        version: Option<&str>,
    ) -> Result<bool, ConvoError> {
        self.rewrite_record(id, type_name, |record| {
            record.version = version.map(str::to_string);
        })
        .await
    }

    /// Physical row count, expired rows included. SQLite only.
    pub async fn row_count(&self) -> Result<u64, ConvoError> {
        Ok(self.require_sqlite()?.stats().await?.total)
    }

    /// Run one cleanup pass. SQLite only.
    pub async fn sweep(&self) -> Result<usize, ConvoError> {
        let store = self.require_sqlite()?;
        CleanupSweeper::new(store.clone(), std::time::Duration::from_secs(3600))
            .sweep_once()
            .await
    }

    fn require_sqlite(&self) -> Result<&Arc<SqliteConversationStore>, ConvoError> {
        self.sqlite
            .as_ref()
            .ok_or_else(|| ConvoError::Internal("operation needs the SQLite backend".to_string()))
    }
}
