// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic removal of expired conversation rows.
//!
//! The first sweep runs as soon as the task starts, then once per interval
//! until the [`CancellationToken`] fires. A failed sweep is logged at `warn`
//! and the next tick tries again.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use convo_config::CleanupConfig;
use convo_core::ConvoError;

/// Something that can drop its expired conversations in bulk.
#[async_trait]
pub trait CleanupTarget: Send + Sync + 'static {
    /// Delete everything that expired strictly before `now`; returns the count.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, ConvoError>;
}

pub struct CleanupSweeper {
    target: Arc<dyn CleanupTarget>,
    interval: Duration,
}

impl CleanupSweeper {
    pub fn new(target: Arc<dyn CleanupTarget>, interval: Duration) -> Self {
        Self {
            target,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Build a sweeper from config, or `None` when cleanup is disabled.
    pub fn from_config(target: Arc<dyn CleanupTarget>, config: &CleanupConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(target, Duration::from_secs(config.interval_secs)))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single sweep now.
    pub async fn sweep_once(&self) -> Result<usize, ConvoError> {
        let removed = self.target.delete_expired(Utc::now()).await?;
        trace!(removed, "deleting expired conversations");
        Ok(removed)
    }

    /// Sweep on every tick until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = self.interval.as_secs(), "cleanup sweeper started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.sweep_once().await {
                        Ok(0) => {}
                        Ok(removed) => debug!(removed, "expired conversations swept"),
                        Err(e) => warn!(error = %e, "expired conversation sweep failed"),
                    }
                }
                _ = cancel.cancelled() => {
                    info!("cleanup sweeper shutting down");
                    break;
                }
            }
        }
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
