// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal contract for a key-value store with per-key expiry.

use std::time::Duration;

use async_trait::async_trait;
use convo_core::{ConvoError, HealthStatus};

#[async_trait]
pub trait ExpiringKv: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Write `value` under `key`, replacing any previous value and expiry.
    /// The key disappears on its own once `ttl` has elapsed.
    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration)
        -> Result<(), ConvoError>;

    /// Current value, or `None` if missing or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, ConvoError>;

    /// Remove `key`; missing keys are not an error.
    async fn delete(&self, key: &str) -> Result<(), ConvoError>;

    async fn ping(&self) -> Result<HealthStatus, ConvoError> {
        Ok(HealthStatus::Healthy)
    }
}
