// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions at the seams of the engine: conversation types, storage
//! backends, and id generation.

pub mod backend;
pub mod conversation;
pub mod id;

pub use backend::{ConversationBackend, ConversationRecord};
pub use conversation::{Conversation, StepField};
pub use id::{IdGenerator, UuidIdGenerator};
