// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage backend contract shared by the key-value and relational strategies.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::ConvoError;
use crate::traits::conversation::Conversation;
use crate::types::{BackendKind, HealthStatus};

/// A conversation as persisted by a backend.
///
/// The header columns (`owner_id`, `version`, `expires_at`) are authoritative:
/// when a record is turned back into a typed conversation they overwrite
/// whatever the serialized payload carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: String,
    pub type_name: String,
    pub owner_id: Option<String>,
    pub version: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub serialized_value: String,
}

impl ConversationRecord {
    /// Build a record from a conversation whose id and expiry are set.
    pub fn from_conversation<T: Conversation>(conversation: &T) -> Result<Self, ConvoError> {
        let header = conversation.header();
        let id = header.id.clone().ok_or_else(|| {
            ConvoError::Internal(format!("`{}` has no id to persist", T::SPEC.type_name))
        })?;
        let expires_at = header.expires_at.ok_or_else(|| {
            ConvoError::Internal(format!("`{}` has no expiry to persist", T::SPEC.type_name))
        })?;
        Ok(Self {
            id,
            type_name: T::SPEC.type_name.to_string(),
            owner_id: header.owner_id.clone(),
            version: header.version.clone(),
            expires_at,
            serialized_value: serde_json::to_string(conversation)?,
        })
    }

    /// Deserialize the payload into `T`, applying the header columns.
    pub fn into_conversation<T: Conversation>(self) -> Result<T, ConvoError> {
        let mut conversation: T = serde_json::from_str(&self.serialized_value)?;
        let header = conversation.header_mut();
        header.id = Some(self.id);
        header.owner_id = self.owner_id;
        header.version = self.version;
        header.expires_at = Some(self.expires_at);
        Ok(conversation)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Time left before expiry, or `None` once expired.
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> Option<Duration> {
        (self.expires_at - now).to_std().ok().filter(|d| !d.is_zero())
    }
}

/// Persistence strategy for conversation records.
///
/// All operations are scoped by `(id, type_name)`. Implementations must:
/// - treat `save` as an upsert that affects exactly one record, reporting
///   anything else as [`ConvoError::Backend`];
/// - make expired records invisible to `find_by_id`, deleting them as a side
///   effect.
#[async_trait]
pub trait ConversationBackend: Send + Sync + 'static {
    /// Human-readable backend name, e.g. `"sqlite"`.
    fn name(&self) -> &str;

    fn kind(&self) -> BackendKind;

    async fn health_check(&self) -> Result<HealthStatus, ConvoError>;

    /// Insert or overwrite the record (value and expiry).
    async fn save(&self, record: &ConversationRecord) -> Result<(), ConvoError>;

    async fn find_by_id(
        &self,
        id: &str,
        type_name: &str,
    ) -> Result<Option<ConversationRecord>, ConvoError>;

    /// Delete the record if present. Deleting a missing record is not an error.
    async fn delete(&self, id: &str, type_name: &str) -> Result<(), ConvoError>;
}

impl dyn ConversationBackend {
    /// Stamp `expires_at = now + ttl` on the conversation and persist it.
    pub async fn save_conversation<T: Conversation>(
        &self,
        conversation: &mut T,
        ttl: Duration,
    ) -> Result<(), ConvoError> {
        conversation.header_mut().expires_at = Some(expiry_after(Utc::now(), ttl)?);
        let record = ConversationRecord::from_conversation(conversation)?;
        trace!(id = %record.id, type_name = %record.type_name, "saving conversation");
        self.save(&record).await
    }

    pub async fn delete_conversation<T: Conversation>(&self, id: &str) -> Result<(), ConvoError> {
        self.delete(id, T::SPEC.type_name).await
    }
}

/// `now + ttl`, or a config error when the sum leaves chrono's range.
fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, ConvoError> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| ConvoError::Config(format!("time-to-live {ttl:?} is out of range")))
}
