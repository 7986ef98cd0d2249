// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `convo serve` and `convo sweep`.
//!
//! `serve` opens the configured backend, keeps the cleanup sweeper running
//! and polls backend health until SIGINT or SIGTERM arrives. `sweep` runs a
//! single cleanup pass against the SQLite store.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use convo_config::{BackendStrategy, ConvoConfig};
use convo_core::{ConversationBackend, ConvoError, HealthStatus};
use convo_engine::open_backend;
use convo_storage::SqliteConversationStore;

use crate::shutdown;

const HEALTH_INTERVAL: Duration = Duration::from_secs(60);

/// Run until a shutdown signal is received.
pub async fn run_serve(config: ConvoConfig) -> Result<(), ConvoError> {
    let cancel = shutdown::install_signal_handler();
    let opened = open_backend(&config, cancel.clone()).await?;

    log_health(opened.backend.health_check().await?);

    let monitor = {
        let backend = Arc::clone(&opened.backend);
        let cancel = cancel.clone();
        tokio::spawn(async move { health_monitor(backend, HEALTH_INTERVAL, cancel).await })
    };

    info!(backend = opened.backend.name(), "convo serving, press Ctrl+C to stop");
    cancel.cancelled().await;
    info!("shutting down");

    if let Some(sweeper) = opened.sweeper {
        if let Err(e) = sweeper.await {
            warn!(error = %e, "cleanup sweeper task ended abnormally");
        }
    }
    if let Err(e) = monitor.await {
        warn!(error = %e, "health monitor task ended abnormally");
    }

    info!("convo stopped");
    Ok(())
}

/// Delete every expired conversation once and report how many went.
pub async fn run_sweep(config: &ConvoConfig) -> Result<(), ConvoError> {
    if config.store.backend != BackendStrategy::Sqlite {
        println!("convo sweep: the key-value backend expires entries on its own, nothing to do");
        return Ok(());
    }

    let store = SqliteConversationStore::open(&config.sqlite).await?;
    let removed = store.delete_expired_before(Utc::now()).await?;
    store.close().await?;

    info!(removed, "manual sweep finished");
    println!("convo sweep: removed {removed} expired conversation(s)");
    Ok(())
}

/// Periodically probes the backend and logs whenever its health changes.
async fn health_monitor(
    backend: Arc<dyn ConversationBackend>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // First tick completes immediately; startup health is already logged.
    ticker.tick().await;

    let mut last = HealthStatus::Healthy;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let status = match backend.health_check().await {
                    Ok(status) => status,
                    Err(e) => HealthStatus::Unhealthy(e.to_string()),
                };
                if status != last {
                    log_health(status.clone());
                    last = status;
                }
            }
            _ = cancel.cancelled() => {
                break;
            }
        }
    }
}

fn log_health(status: HealthStatus) {
    match status {
        HealthStatus::Healthy => info!("backend healthy"),
        HealthStatus::Degraded(reason) => warn!(reason = %reason, "backend degraded"),
        HealthStatus::Unhealthy(reason) => warn!(reason = %reason, "backend unhealthy"),
    }
}

#[cfg(test)]
mod tests {
    use convo_config::SqliteConfig;

    use super::*;

    fn sqlite_config(dir: &tempfile::TempDir) -> ConvoConfig {
        ConvoConfig {
            sqlite: SqliteConfig {
                database_path: dir.path().join("convo.db").display().to_string(),
                ..SqliteConfig::default()
            },
            ..ConvoConfig::default()
        }
    }

    #[tokio::test]
    async fn sweep_on_fresh_database_succeeds() {
        let dir = tempfile::TempDir::new().unwrap();
        run_sweep(&sqlite_config(&dir)).await.unwrap();
        assert!(dir.path().join("convo.db").exists());
    }

    #[tokio::test]
    async fn sweep_is_a_no_op_for_key_value() {
        let mut config = ConvoConfig::default();
        config.store.backend = BackendStrategy::KeyValue;
        run_sweep(&config).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn health_monitor_stops_on_cancel() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = SqliteConversationStore::open(&sqlite_config(&dir).sqlite)
            .await
            .unwrap();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(health_monitor(
            Arc::new(store),
            Duration::from_secs(5),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_secs(12)).await;
        cancel.cancel();
        handle.await.unwrap();
    }
}
