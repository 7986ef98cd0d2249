// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-call correlation of the current conversation id.
//!
//! A [`ConversationContext`] lives for one logical call (typically one inbound
//! request). The transport layer seeds it from the [`CONVERSATION_ID_HEADER`]
//! header when present; otherwise the first save generates an id and stores
//! it here so subsequent saves in the same call reuse it.

/// Conventional inbound header carrying the conversation id.
pub const CONVERSATION_ID_HEADER: &str = "X-Conversation-Id";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationContext {
    conversation_id: Option<String>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the context from a raw header value. Blank values are ignored.
    pub fn from_header(value: Option<&str>) -> Self {
        Self {
            conversation_id: value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        }
    }

    pub fn get(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn set(&mut self, id: impl Into<String>) {
        self.conversation_id = Some(id.into());
    }
}
