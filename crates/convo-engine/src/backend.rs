// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the configured [`ConversationBackend`].

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use convo_config::{BackendStrategy, ConvoConfig};
use convo_core::{ConversationBackend, ConvoError};
use convo_kv::KeyValueConversationStore;
use convo_storage::{CleanupSweeper, SqliteConversationStore};

/// A ready backend plus the sweeper task it needs, if any.
pub struct OpenedBackend {
    pub backend: Arc<dyn ConversationBackend>,
    /// Running cleanup sweeper; stops when the token passed to
    /// [`open_backend`] is cancelled.
    pub sweeper: Option<JoinHandle<()>>,
}

/// Open the backend selected by `config.store.backend`.
///
/// For SQLite with cleanup enabled a sweeper is spawned on the current
/// runtime and tied to `cancel`.
pub async fn open_backend(
    config: &ConvoConfig,
    cancel: CancellationToken,
) -> Result<OpenedBackend, ConvoError> {
    match config.store.backend {
        BackendStrategy::Sqlite => {
            let store = Arc::new(SqliteConversationStore::open(&config.sqlite).await?);
            let sweeper = CleanupSweeper::from_config(store.clone(), &config.sqlite.cleanup)
                .map(|sweeper| sweeper.spawn(cancel));
            info!(
                backend = "sqlite",
                path = %config.sqlite.database_path,
                sweeper = sweeper.is_some(),
                "conversation backend opened"
            );
            Ok(OpenedBackend {
                backend: store,
                sweeper,
            })
        }
        BackendStrategy::KeyValue => {
            let backend = open_key_value(config).await?;
            info!(backend = backend.name(), "conversation backend opened");
            Ok(OpenedBackend {
                backend,
                sweeper: None,
            })
        }
    }
}

async fn open_key_value(config: &ConvoConfig) -> Result<Arc<dyn ConversationBackend>, ConvoError> {
    let prefix = config.key_value.key_prefix.clone();
    match config.key_value.url.as_deref() {
        None => Ok(Arc::new(KeyValueConversationStore::new(
            convo_kv::MemoryKv::new(),
            prefix,
        ))),
        #[cfg(feature = "redis")]
        Some(url) => {
            let kv = convo_kv::RedisKv::connect(url).await?;
            Ok(Arc::new(KeyValueConversationStore::new(kv, prefix)))
        }
        #[cfg(not(feature = "redis"))]
        Some(_) => Err(ConvoError::Config(
            "key_value.url is set but convo was built without the `redis` feature".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use convo_core::BackendKind;

    use super::*;

    #[tokio::test]
    async fn key_value_without_url_is_in_process() {
        let mut config = ConvoConfig::default();
        config.store.backend = BackendStrategy::KeyValue;

        let opened = open_backend(&config, CancellationToken::new()).await.unwrap();
        assert_eq!(opened.backend.kind(), BackendKind::KeyValue);
        assert_eq!(opened.backend.name(), "memory");
        assert!(opened.sweeper.is_none());
    }

    #[tokio::test]
    async fn sqlite_spawns_sweeper_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ConvoConfig::default();
        config.sqlite.database_path = dir.path().join("c.db").display().to_string();

        let cancel = CancellationToken::new();
        let opened = open_backend(&config, cancel.clone()).await.unwrap();
        assert_eq!(opened.backend.kind(), BackendKind::Relational);

        cancel.cancel();
        opened.sweeper.unwrap().await.unwrap();
    }

    #[tokio::test]
    async fn sqlite_without_cleanup_has_no_sweeper() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ConvoConfig::default();
        config.sqlite.database_path = dir.path().join("c.db").display().to_string();
        config.sqlite.cleanup.enabled = false;

        let opened = open_backend(&config, CancellationToken::new()).await.unwrap();
        assert!(opened.sweeper.is_none());
    }
}
