// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process [`ExpiringKv`] on a `DashMap`.
//!
//! Entries carry a deadline and are dropped lazily when touched after it, or
//! in bulk through [`MemoryKv::purge_expired`].

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use convo_core::ConvoError;

use crate::store::ExpiringKv;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    deadline: Instant,
}

#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: DashMap<String, Entry>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| e.deadline > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, e| e.deadline > now);
        before - self.entries.len()
    }
}

#[async_trait]
impl ExpiringKv for MemoryKv {
    fn name(&self) -> &str {
        "memory"
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), ConvoError> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                deadline: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, ConvoError> {
        let now = Instant::now();
        match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) if entry.deadline > now => return Ok(Some(entry.value.clone())),
            Some(_) => {}
        }
        // A concurrent set may have refreshed the key since the read.
        self.entries.remove_if(key, |_, e| e.deadline <= now);
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<(), ConvoError> {
        self.entries.remove(key);
        Ok(())
    }
}
