//! annoprod library root.
//! Production and quality analytics over annotation task event logs: span
//! reconstruction, attribution, aggregation, labor merge and rating, plus the
//! file-based CLI around them.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod export;
pub mod ingest;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `annoprod=debug`).
pub const LOG_ENV: &str = "ANNOPROD_LOG";

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Production { .. } => cli::commands::production::handle(&cli.command, cfg),
        Commands::Rating { .. } => cli::commands::rating::handle(&cli.command, cfg),
        Commands::Spans { .. } => cli::commands::spans::handle(&cli.command, cfg),
        Commands::Config { .. } => {
            cli::commands::config::handle(&cli.command, &config_path(cli))
        }
    }
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config
        .as_deref()
        .map(utils::path::expand_tilde)
        .unwrap_or_else(Config::config_file)
}

/// Logs go to stderr so that stdout only carries command output.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // `config --init` must work even when the current file does not parse.
    if let Commands::Config { .. } = cli.command {
        return dispatch(&cli, &Config::default());
    }

    let cfg = Config::load(Some(&config_path(&cli)))?;
    dispatch(&cli, &cfg)
}
