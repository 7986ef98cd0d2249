// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./convo.toml` > `~/.config/convo/convo.toml` > `/etc/convo/convo.toml`
//! with environment variable overrides via `CONVO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ConvoConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/convo/convo.toml` (system-wide)
/// 3. `~/.config/convo/convo.toml` (user XDG config)
/// 4. `./convo.toml` (local directory)
/// 5. `CONVO_*` environment variables
pub fn load_config() -> Result<ConvoConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
pub fn load_config_from_str(toml_content: &str) -> Result<ConvoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConvoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ConvoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConvoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ConvoConfig::default()))
        .merge(Toml::file("/etc/convo/convo.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("convo/convo.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("convo.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CONVO_SQLITE_DATABASE_PATH` must map to `sqlite.database_path`
/// and `CONVO_SQLITE_CLEANUP_INTERVAL_SECS` to `sqlite.cleanup.interval_secs`.
fn env_provider() -> Env {
    Env::prefixed("CONVO_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: &[(&str, &str)] = &[
        ("sqlite_cleanup_", "sqlite.cleanup."),
        ("sqlite_", "sqlite."),
        ("key_value_", "key_value."),
        ("store_", "store."),
        ("log_", "log."),
    ];

    for (prefix, dotted) in SECTIONS {
        if let Some(rest) = key.strip_prefix(prefix) {
            return format!("{dotted}{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("log_level"), "log.level");
        assert_eq!(map_env_key("store_backend"), "store.backend");
        assert_eq!(map_env_key("sqlite_database_path"), "sqlite.database_path");
        assert_eq!(
            map_env_key("sqlite_cleanup_interval_secs"),
            "sqlite.cleanup.interval_secs"
        );
        assert_eq!(map_env_key("key_value_url"), "key_value.url");
        assert_eq!(map_env_key("key_value_key_prefix"), "key_value.key_prefix");
    }

    #[test]
    fn unknown_env_keys_pass_through() {
        assert_eq!(map_env_key("something"), "something");
    }
}
