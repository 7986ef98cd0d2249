// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the convo conversation state engine.
//!
//! TOML files are merged along the XDG hierarchy, `CONVO_*` environment
//! variables override them, and unknown keys are rejected with miette
//! diagnostics that suggest the closest valid key.
//!
//! ```no_run
//! use convo_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("backend: {:?}", config.store.backend);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    BackendStrategy, CleanupConfig, ConvoConfig, KeyValueConfig, LogConfig, SqliteConfig,
    StoreConfig,
};

/// Load from the XDG hierarchy and environment, then validate.
pub fn load_and_validate() -> Result<ConvoConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load a single file (plus environment overrides) and validate.
pub fn load_and_validate_path(path: &Path) -> Result<ConvoConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources: Vec<(String, String)> = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load an inline TOML string and validate. No files or env vars are consulted.
pub fn load_and_validate_str(toml_content: &str) -> Result<ConvoConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Contents of every config file that exists, for span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|d| d.join("convo.toml"))
        .unwrap_or_else(|_| "convo.toml".into());
    let user = dirs::config_dir().map(|d| d.join("convo/convo.toml"));
    let system = Path::new("/etc/convo/convo.toml").to_path_buf();

    [Some(local), user, Some(system)]
        .into_iter()
        .flatten()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
