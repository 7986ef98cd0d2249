// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`ConversationBackend`] over any [`ExpiringKv`].

use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, trace};

use convo_core::{BackendKind, ConversationBackend, ConversationRecord, ConvoError, HealthStatus};

use crate::memory::MemoryKv;
use crate::store::ExpiringKv;

/// Shortest expiry handed to the store; a zero TTL would mean "no expiry"
/// or an error on some stores.
const MIN_TTL: Duration = Duration::from_millis(1);

/// Stores each conversation as one JSON value under
/// `<prefix>:<type_name>:<id>` with the store's native expiry.
pub struct KeyValueConversationStore<K = MemoryKv> {
    kv: K,
    key_prefix: String,
}

impl KeyValueConversationStore<MemoryKv> {
    /// In-process store with the default `convo` prefix.
    pub fn in_memory() -> Self {
        Self::new(MemoryKv::new(), convo_config::KeyValueConfig::default().key_prefix)
    }
}

impl<K: ExpiringKv> KeyValueConversationStore<K> {
    pub fn new(kv: K, key_prefix: impl Into<String>) -> Self {
        Self {
            kv,
            key_prefix: key_prefix.into(),
        }
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn key_for(&self, id: &str, type_name: &str) -> String {
        format!("{}:{type_name}:{id}", self.key_prefix)
    }
}

#[async_trait]
impl<K: ExpiringKv> ConversationBackend for KeyValueConversationStore<K> {
    fn name(&self) -> &str {
        self.kv.name()
    }

    fn kind(&self) -> BackendKind {
        BackendKind::KeyValue
    }

    async fn health_check(&self) -> Result<HealthStatus, ConvoError> {
        self.kv.ping().await
    }

    async fn save(&self, record: &ConversationRecord) -> Result<(), ConvoError> {
        let key = self.key_for(&record.id, &record.type_name);
        let ttl = record.remaining_ttl(Utc::now()).unwrap_or(MIN_TTL).max(MIN_TTL);
        let value = serde_json::to_string(record)?;
        trace!(key = %key, ttl_ms = ttl.as_millis() as u64, "writing conversation");
        self.kv.set_with_ttl(&key, value, ttl).await
    }

    async fn find_by_id(
        &self,
        id: &str,
        type_name: &str,
    ) -> Result<Option<ConversationRecord>, ConvoError> {
        let key = self.key_for(id, type_name);
        let Some(raw) = self.kv.get(&key).await? else {
            debug!(id, "conversation not found");
            return Ok(None);
        };

        let record: ConversationRecord = serde_json::from_str(&raw)?;
        // Store expiry and the recorded deadline can drift by a few ms. The
        // key is left to the store's own expiry: a delete here could remove a
        // value rewritten since the read.
        if record.is_expired_at(Utc::now()) {
            debug!(id, "conversation expired");
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn delete(&self, id: &str, type_name: &str) -> Result<(), ConvoError> {
        trace!(id, type_name, "deleting conversation");
        self.kv.delete(&self.key_for(id, type_name)).await
    }
}
