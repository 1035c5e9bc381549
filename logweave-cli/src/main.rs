//! logweave CLI entry point
//!
//! Parses arguments, loads settings, installs logging and dispatches to the
//! subcommand handler. Errors are printed to stderr and mapped to an exit code.
//!
//! No metrics recorder is installed: a single compile has nothing to scrape, so
//! the compiler's counters are no-ops here.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::path::Path;

use clap::Parser;

use logweave_core::config::LogweaveConfig;

use cli::{Cli, Commands};
use error::CliError;
use output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);
    let config_path = cli.config.as_deref();

    match cli.command {
        // settings problems are reported by `config validate`, not fatal up front
        Commands::Config(args) => commands::config::execute(args, config_path, &writer).await,
        Commands::Render(args) => {
            let config = prepare(config_path, cli.log_level).await?;
            commands::render::execute(args, &config).await
        }
        Commands::Validate(args) => {
            let config = prepare(config_path, cli.log_level).await?;
            commands::validate::execute(args, &config, &writer).await
        }
    }
}

/// Load settings, apply `--log-level` and install logging.
async fn prepare(
    config_path: Option<&Path>,
    log_level: Option<String>,
) -> Result<LogweaveConfig, CliError> {
    let mut settings = commands::config::load_settings(config_path).await?;
    if let Some(level) = log_level {
        settings.config.general.log_level = level;
        settings.config.validate()?;
    }
    logging::init_tracing(&settings.config.general)?;
    tracing::debug!(source = %settings.source, "settings loaded");
    Ok(settings.config)
}
