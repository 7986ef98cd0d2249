// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation orchestrator.
//!
//! [`ConversationManager`] assigns ids, stamps and checks schema versions,
//! binds owners, runs step invalidation and hands records to the configured
//! [`ConversationBackend`].

use std::any::TypeId;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::{debug, info};

use convo_core::{
    Conversation, ConversationBackend, ConversationContext, ConversationRecord, ConvoError,
    IdGenerator, Owner, UuidIdGenerator,
};

use crate::invalidation::invalidate;
use crate::steps::{validate_steps, StepLayout};

/// Per-type settings resolved once from [`Conversation::SPEC`].
#[derive(Debug, Clone)]
struct TypeProfile {
    time_to_live: Duration,
    version: Option<&'static str>,
    layout: StepLayout,
}

pub struct ConversationManager {
    backend: Arc<dyn ConversationBackend>,
    id_generator: Arc<dyn IdGenerator>,
    profiles: DashMap<TypeId, Arc<TypeProfile>>,
}

impl ConversationManager {
    /// Manager over `backend` generating UUID v4 ids.
    pub fn new(backend: Arc<dyn ConversationBackend>) -> Self {
        Self {
            backend,
            id_generator: Arc::new(UuidIdGenerator),
            profiles: DashMap::new(),
        }
    }

    pub fn with_id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = id_generator;
        self
    }

    pub fn backend(&self) -> &Arc<dyn ConversationBackend> {
        &self.backend
    }

    /// Validate `T`'s step layout and time-to-live up front.
    ///
    /// Optional: unregistered types are resolved on first use, but calling
    /// this at startup surfaces malformed types before any request does.
    pub fn register<T: Conversation>(&self) -> Result<StepLayout, ConvoError> {
        let profile = self.profile::<T>()?;
        info!(
            type_name = T::SPEC.type_name,
            steps = profile.layout.steps,
            version = profile.version.unwrap_or("-"),
            ttl_secs = profile.time_to_live.as_secs(),
            "conversation type registered"
        );
        Ok(profile.layout)
    }

    fn profile<T: Conversation>(&self) -> Result<Arc<TypeProfile>, ConvoError> {
        let key = TypeId::of::<T>();
        if let Some(profile) = self.profiles.get(&key) {
            return Ok(Arc::clone(&profile));
        }

        let profile = Arc::new(TypeProfile {
            time_to_live: T::SPEC.parse_time_to_live()?,
            version: T::SPEC.version,
            layout: validate_steps::<T>()?,
        });
        self.profiles.insert(key, Arc::clone(&profile));
        Ok(profile)
    }

    /// Persist `conversation` on behalf of `owner`.
    ///
    /// A conversation without an id takes the id from `ctx`, or a fresh one
    /// that is then stored in `ctx`, and is stamped with the type's schema
    /// version. Fields of steps after the one being submitted are cleared
    /// before the write; see [`invalidate`]. A stored record of another
    /// schema version fails with [`ConvoError::VersionMismatch`] and must be
    /// deleted before the id is reused.
    pub async fn save<'a, T: Conversation>(
        &self,
        ctx: &mut ConversationContext,
        owner: impl Into<Owner>,
        conversation: impl Into<Option<&'a mut T>>,
    ) -> Result<(), ConvoError> {
        let conversation = conversation.into().ok_or(ConvoError::NullObject)?;
        let profile = self.profile::<T>()?;

        if conversation.header().id.is_none() {
            let id = match ctx.get() {
                Some(id) => id.to_string(),
                None => {
                    let id = self.id_generator.generate_new_id();
                    ctx.set(id.clone());
                    id
                }
            };
            debug!(type_name = T::SPEC.type_name, id = %id, "setting conversation id");
            let header = conversation.header_mut();
            header.id = Some(id);
            header.version = profile.version.map(str::to_string);
        }
        conversation.header_mut().owner_id = owner.into().into_inner();

        let id = conversation.id().unwrap_or_default().to_string();
        if !profile.layout.is_exempt() {
            let stored = match self.backend.find_by_id(&id, T::SPEC.type_name).await? {
                Some(record) => {
                    check_version(&profile, &record)?;
                    Some(record.into_conversation::<T>()?)
                }
                None => None,
            };
            invalidate(&T::step_fields(), conversation, stored.as_ref())?;
        }

        self.backend
            .save_conversation(conversation, profile.time_to_live)
            .await
    }

    /// Load conversation `id` of type `T` for `owner`.
    ///
    /// Missing and foreign conversations both yield
    /// [`ConvoError::NotFoundOrForbidden`]. An anonymous owner skips the
    /// ownership check. The schema version is compared before the payload is
    /// decoded, so a record of another version is reported as
    /// [`ConvoError::VersionMismatch`] whatever its shape.
    pub async fn find_by_id<T: Conversation>(
        &self,
        owner: impl Into<Owner>,
        id: &str,
    ) -> Result<T, ConvoError> {
        let owner = owner.into();
        let profile = self.profile::<T>()?;

        let record = self
            .backend
            .find_by_id(id, T::SPEC.type_name)
            .await?
            .filter(|r| owner.permits(r.owner_id.as_deref()))
            .ok_or_else(|| not_found(id, &owner))?;

        check_version(&profile, &record)?;
        record.into_conversation()
    }

    /// Delete conversation `id` of type `T` for `owner`. Missing ids succeed.
    ///
    /// Only the owner column is consulted, so records of any schema version
    /// can be discarded.
    pub async fn delete<T: Conversation>(
        &self,
        owner: impl Into<Owner>,
        id: &str,
    ) -> Result<(), ConvoError> {
        let owner = owner.into();
        let Some(existing) = self.backend.find_by_id(id, T::SPEC.type_name).await? else {
            debug!(id, "nothing to delete");
            return Ok(());
        };
        if !owner.permits(existing.owner_id.as_deref()) {
            return Err(not_found(id, &owner));
        }
        self.backend.delete_conversation::<T>(id).await
    }
}

/// Stored version must equal the type's declared one, ignoring ASCII case.
/// Types without a declared version accept any record.
fn check_version(profile: &TypeProfile, record: &ConversationRecord) -> Result<(), ConvoError> {
    let Some(expected) = profile.version else {
        return Ok(());
    };
    let found = record.version.as_deref();
    if found.is_some_and(|v| v.eq_ignore_ascii_case(expected)) {
        return Ok(());
    }
    Err(ConvoError::VersionMismatch {
        conversation_id: record.id.clone(),
        expected: expected.to_string(),
        found: found.map(str::to_string),
    })
}

fn not_found(id: &str, owner: &Owner) -> ConvoError {
    ConvoError::NotFoundOrForbidden {
        conversation_id: id.to_string(),
        owner_id: owner.id().map(str::to_string),
    }
}
