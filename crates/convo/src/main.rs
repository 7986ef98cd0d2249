// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! convo - conversation state engine.
//!
//! Binary entry point: configuration checks, maintenance commands and a
//! long-running `serve` mode that keeps the cleanup sweeper alive.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod serve;
mod shutdown;
mod stats;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use convo_config::{ConfigError, ConvoConfig};

/// convo - conversation state engine.
#[derive(Parser, Debug)]
#[command(name = "convo", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the backend and run the cleanup sweeper until interrupted.
    Serve,
    /// Check configuration and backend health.
    #[command(alias = "doctor")]
    Check {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Show stored conversation counts (SQLite backend).
    Stats {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Delete expired conversations once and exit (SQLite backend).
    Sweep,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            convo_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.log.level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Check { plain }) => check::run_check(&config, plain).await,
        Some(Commands::Stats { json, plain }) => stats::run_stats(&config, json, plain).await,
        Some(Commands::Sweep) => serve::run_sweep(&config).await,
        None => {
            println!("convo: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("convo: {e}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<ConvoConfig, Vec<ConfigError>> {
    match path {
        Some(path) => convo_config::load_and_validate_path(path),
        None => convo_config::load_and_validate(),
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("convo={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::CommandFactory;

    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_config_flag_parses_after_subcommand() {
        let cli = Cli::try_parse_from(["convo", "stats", "--json", "--config", "/tmp/c.toml"])
            .unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/c.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Stats {
                json: true,
                plain: false
            })
        ));
    }

    #[test]
    fn doctor_is_an_alias_for_check() {
        let cli = Cli::try_parse_from(["convo", "doctor", "--plain"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Check { plain: true })));
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\nbackend = \"key_value\"").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.store.backend, convo_config::BackendStrategy::KeyValue);
    }
}
