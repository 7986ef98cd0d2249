// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the convo conversation state engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level convo configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConvoConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Which backend strategy stores conversations.
    #[serde(default)]
    pub store: StoreConfig,

    /// Relational (SQLite) backend settings.
    #[serde(default)]
    pub sqlite: SqliteConfig,

    /// Expiring key-value backend settings.
    #[serde(default)]
    pub key_value: KeyValueConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Backend strategy selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendStrategy {
    /// SQLite table with an `expires_at` column and a cleanup sweeper.
    #[default]
    Sqlite,
    /// Key-value store with native per-key expiry.
    KeyValue,
}

/// Backend selection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// `sqlite` (default) or `key_value`.
    #[serde(default)]
    pub backend: BackendStrategy,
}

/// SQLite backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SqliteConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// How long a statement waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Background sweep of expired rows.
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            busy_timeout_ms: default_busy_timeout_ms(),
            cleanup: CleanupConfig::default(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("convo").join("convo.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("convo.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

/// Expired-row sweeper configuration.
///
/// Lazy expiry on read only removes rows that are read again; the sweeper
/// removes the rest.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CleanupConfig {
    /// Run the sweeper alongside the SQLite backend.
    #[serde(default = "default_cleanup_enabled")]
    pub enabled: bool,

    /// Seconds between sweeps.
    #[serde(default = "default_cleanup_interval_secs")]
    pub interval_secs: u64,

    /// Maximum rows deleted per statement; a sweep loops until done.
    #[serde(default = "default_cleanup_batch_size")]
    pub batch_size: u32,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: default_cleanup_enabled(),
            interval_secs: default_cleanup_interval_secs(),
            batch_size: default_cleanup_batch_size(),
        }
    }
}

fn default_cleanup_enabled() -> bool {
    true
}

fn default_cleanup_interval_secs() -> u64 {
    900 // 15 minutes
}

fn default_cleanup_batch_size() -> u32 {
    500
}

/// Key-value backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeyValueConfig {
    /// Redis URL (`redis://` or `rediss://`). `None` uses the in-process store.
    #[serde(default)]
    pub url: Option<String>,

    /// Prefix for every key, as in `<prefix>:<type>:<id>`.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for KeyValueConfig {
    fn default() -> Self {
        Self {
            url: None,
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_key_prefix() -> String {
    "convo".to_string()
}
