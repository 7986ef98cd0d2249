// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation state engine.
//!
//! - [`steps`]: validates a type's step numbering.
//! - [`invalidation`]: clears fields of steps after the one being submitted.
//! - [`ConversationManager`]: the orchestrator callers talk to.
//! - [`open_backend`]: builds the backend named in configuration.

pub mod backend;
pub mod invalidation;
pub mod manager;
pub mod steps;

pub use backend::{open_backend, OpenedBackend};
pub use invalidation::{invalidate, is_empty_value, Invalidation};
pub use manager::ConversationManager;
pub use steps::{validate_steps, StepLayout};
