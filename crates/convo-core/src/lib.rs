// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the convo conversation state engine.
//!
//! This crate provides the trait definitions, error type, and common types
//! shared by the engine and every storage backend.

pub mod context;
pub mod error;
pub mod traits;
pub mod ttl;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use context::{ConversationContext, CONVERSATION_ID_HEADER};
pub use error::ConvoError;
pub use traits::{
    Conversation, ConversationBackend, ConversationRecord, IdGenerator, StepField,
    UuidIdGenerator,
};
pub use types::{BackendKind, ConversationHeader, ConversationSpec, HealthStatus, Owner};

#[doc(hidden)]
pub mod __private {
    pub use serde_json;

    /// A fresh `Default` of the same type as `_field`.
    pub fn default_like<F: Default>(_field: &F) -> F {
        F::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convo_error_has_all_variants() {
        let _null = ConvoError::NullObject;
        let _forbidden = ConvoError::NotFoundOrForbidden {
            conversation_id: "c".into(),
            owner_id: None,
        };
        let _version = ConvoError::VersionMismatch {
            conversation_id: "c".into(),
            expected: "2".into(),
            found: Some("1".into()),
        };
        let _steps = ConvoError::InvalidStepConfiguration {
            type_name: "T".into(),
            reason: "gap".into(),
        };
        let _multi = ConvoError::MultiStepUpdateRejected {
            type_name: "T".into(),
            steps: vec![1, 2],
            fields: vec!["a".into(), "b".into()],
        };
        let _backend = ConvoError::Backend {
            source: Box::new(std::io::Error::other("test")),
        };
        let _config = ConvoError::Config("test".into());
        let _internal = ConvoError::Internal("test".into());
    }

    #[test]
    fn caller_facing_classification() {
        assert!(ConvoError::backend("row count 0").is_caller_facing());
        assert!(ConvoError::VersionMismatch {
            conversation_id: "c".into(),
            expected: "2".into(),
            found: None,
        }
        .is_caller_facing());
        assert!(!ConvoError::NullObject.is_caller_facing());
        assert!(!ConvoError::InvalidStepConfiguration {
            type_name: "T".into(),
            reason: "gap".into(),
        }
        .is_caller_facing());
    }

    #[test]
    fn backend_error_message_is_preserved() {
        let err = ConvoError::backend("failed to insert object");
        assert_eq!(err.to_string(), "backend error: failed to insert object");
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_backend<T: ConversationBackend>() {}
        fn _assert_id_generator<T: IdGenerator>() {}
        _assert_id_generator::<UuidIdGenerator>();
    }
}
