// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `convo stats` command implementation.
//!
//! Reports how many conversations the SQLite store holds, how many of them
//! are expired and waiting for the sweeper, and a per-type breakdown.

use std::collections::BTreeMap;
use std::io::IsTerminal;

use serde::Serialize;

use convo_config::{BackendStrategy, ConvoConfig};
use convo_core::ConvoError;
use convo_storage::{SqliteConversationStore, TableStats};

/// Structured output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub database_path: String,
    pub total: u64,
    pub expired: u64,
    pub by_type: BTreeMap<String, u64>,
}

impl StatsResponse {
    fn new(database_path: &str, stats: TableStats) -> Self {
        Self {
            database_path: database_path.to_string(),
            total: stats.total,
            expired: stats.expired,
            by_type: stats.by_type.into_iter().collect(),
        }
    }
}

/// Run the `convo stats` command.
///
/// With `--json`, prints structured JSON for scripting. With `--plain`, or
/// when stdout is not a TTY, disables colors.
pub async fn run_stats(config: &ConvoConfig, json: bool, plain: bool) -> Result<(), ConvoError> {
    if config.store.backend != BackendStrategy::Sqlite {
        return Err(ConvoError::Config(
            "`convo stats` needs store.backend = \"sqlite\"".to_string(),
        ));
    }

    let store = SqliteConversationStore::open(&config.sqlite).await?;
    let stats = store.stats().await?;
    store.close().await?;

    let response = StatsResponse::new(&config.sqlite.database_path, stats);
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print!("{}", render_table(&response, use_color));
    }
    Ok(())
}

fn render_table(response: &StatsResponse, use_color: bool) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str("  convo stats\n");
    out.push_str(&format!("  {}\n", "-".repeat(35)));
    out.push_str(&format!("    Database: {}\n", response.database_path));
    out.push_str(&format!("    Stored:   {}\n", response.total));

    let expired = response.expired.to_string();
    if use_color && response.expired > 0 {
        use colored::Colorize;
        out.push_str(&format!("    Expired:  {}\n", expired.yellow()));
    } else {
        out.push_str(&format!("    Expired:  {expired}\n"));
    }

    if !response.by_type.is_empty() {
        out.push('\n');
        for (type_name, rows) in &response.by_type {
            out.push_str(&format!("    {type_name:<24} {rows:>8}\n"));
        }
    }
    out.push('\n');
    out
}
