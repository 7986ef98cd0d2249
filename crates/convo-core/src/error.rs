// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the convo conversation state engine.

use thiserror::Error;

/// The primary error type used across all convo crates.
#[derive(Debug, Error)]
pub enum ConvoError {
    /// `save` was called without a conversation object.
    #[error("conversation object is absent")]
    NullObject,

    /// No conversation with this id, or it belongs to another owner.
    ///
    /// The two cases are indistinguishable to callers.
    #[error("invalid conversation/owner combination for conversation `{conversation_id}`")]
    NotFoundOrForbidden {
        conversation_id: String,
        owner_id: Option<String>,
    },

    /// The stored conversation was written under a different schema version.
    #[error(
        "conversation `{conversation_id}` has version {found:?}, expected `{expected}`"
    )]
    VersionMismatch {
        conversation_id: String,
        expected: String,
        found: Option<String>,
    },

    /// The conversation type declares malformed step metadata.
    #[error("invalid step configuration for `{type_name}`: {reason}")]
    InvalidStepConfiguration { type_name: String, reason: String },

    /// A single save touched fields belonging to more than one step.
    #[error(
        "cannot update more than one step at a time in `{type_name}`: steps {steps:?}, fields {fields:?}"
    )]
    MultiStepUpdateRejected {
        type_name: String,
        steps: Vec<u32>,
        fields: Vec<String>,
    },

    /// Storage backend failure, including an unexpected affected-row count.
    #[error("backend error: {source}")]
    Backend {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Payload could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration values (TTL strings, backend settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConvoError {
    /// Build a [`ConvoError::Backend`] from a plain message.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            source: message.into().into(),
        }
    }

    /// Whether the caller can recover from this error, for example by
    /// restarting the conversation. Everything else is a defect in a
    /// conversation type or in the engine.
    pub fn is_caller_facing(&self) -> bool {
        matches!(
            self,
            Self::NotFoundOrForbidden { .. }
                | Self::VersionMismatch { .. }
                | Self::MultiStepUpdateRejected { .. }
                | Self::Backend { .. }
        )
    }
}
