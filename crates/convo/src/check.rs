// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `convo check` command implementation.
//!
//! Runs quick checks against the configured backend to spot problems before
//! the engine is put to work.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use convo_config::{BackendStrategy, ConvoConfig};
use convo_core::{ConvoError, HealthStatus};
use convo_engine::open_backend;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `convo check` command.
///
/// Exits with an error when any check fails; warnings are only reported.
pub async fn run_check(config: &ConvoConfig, plain: bool) -> Result<(), ConvoError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let results = collect_checks(config).await;

    println!();
    println!("  convo check");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", format_line(result, use_color));
    }
    println!();

    let fail_count = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count();
    let issues = results
        .iter()
        .filter(|r| r.status != CheckStatus::Pass)
        .count();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    if fail_count > 0 {
        return Err(ConvoError::Internal(format!(
            "{fail_count} check(s) failed"
        )));
    }
    Ok(())
}

async fn collect_checks(config: &ConvoConfig) -> Vec<CheckResult> {
    let mut results = vec![check_config(config)];
    if config.store.backend == BackendStrategy::Sqlite {
        results.push(check_database_file(&config.sqlite.database_path));
        results.push(check_cleanup(config));
    }
    results.push(check_backend(config).await);
    results
}

/// Configuration was loaded and validated before any command ran; report
/// what it selected.
fn check_config(config: &ConvoConfig) -> CheckResult {
    let start = Instant::now();
    let backend = match config.store.backend {
        BackendStrategy::Sqlite => "sqlite",
        BackendStrategy::KeyValue => "key_value",
    };
    CheckResult::new(
        "Configuration",
        CheckStatus::Pass,
        format!("valid (backend={backend})"),
        start,
    )
}

fn check_database_file(db_path: &str) -> CheckResult {
    let start = Instant::now();
    match std::fs::metadata(db_path) {
        Ok(meta) => CheckResult::new(
            "Database file",
            CheckStatus::Pass,
            format!("{db_path} ({} bytes)", meta.len()),
            start,
        ),
        Err(_) => CheckResult::new(
            "Database file",
            CheckStatus::Warn,
            format!("not found: {db_path} (will be created on first use)"),
            start,
        ),
    }
}

fn check_cleanup(config: &ConvoConfig) -> CheckResult {
    let start = Instant::now();
    let cleanup = &config.sqlite.cleanup;
    if cleanup.enabled {
        CheckResult::new(
            "Cleanup sweeper",
            CheckStatus::Pass,
            format!(
                "every {}s, {} rows per batch",
                cleanup.interval_secs, cleanup.batch_size
            ),
            start,
        )
    } else {
        CheckResult::new(
            "Cleanup sweeper",
            CheckStatus::Warn,
            "disabled; expired rows are only removed when read",
            start,
        )
    }
}

/// Open the backend (without a sweeper) and ask it for its health.
async fn check_backend(config: &ConvoConfig) -> CheckResult {
    let start = Instant::now();
    let mut probe_config = config.clone();
    probe_config.sqlite.cleanup.enabled = false;

    let opened = match open_backend(&probe_config, CancellationToken::new()).await {
        Ok(opened) => opened,
        Err(e) => return CheckResult::new("Backend", CheckStatus::Fail, e.to_string(), start),
    };
    let name = opened.backend.name().to_string();
    match opened.backend.health_check().await {
        Ok(HealthStatus::Healthy) => {
            CheckResult::new("Backend", CheckStatus::Pass, format!("{name}: healthy"), start)
        }
        Ok(HealthStatus::Degraded(reason)) => CheckResult::new(
            "Backend",
            CheckStatus::Warn,
            format!("{name}: degraded ({reason})"),
            start,
        ),
        Ok(HealthStatus::Unhealthy(reason)) => CheckResult::new(
            "Backend",
            CheckStatus::Fail,
            format!("{name}: unhealthy ({reason})"),
            start,
        ),
        Err(e) => CheckResult::new("Backend", CheckStatus::Fail, format!("{name}: {e}"), start),
    }
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!(
            "    {symbol} {:<20} {message} ({duration_ms}ms)",
            result.name
        )
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}
