//! Main entry point for the `callmetrics` binary.

use anyhow::{Context, Result};
use callmetrics_cli::{run_report, run_seed, Cli, Command};
use callmetrics_common::init_logging;
use callmetrics_config::ConfigLoader;
use clap::Parser;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Reported after the subscriber is installed.
    let source = cli.config.clone().or_else(ConfigLoader::locate);
    let mut config = match &source {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ConfigLoader::load().context("loading configuration")?,
    };

    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if cli.json_logs {
        config.logging.json_format = true;
    }
    init_logging(config.logging.to_logging_config()).context("initializing logging")?;
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("No configuration file found, using defaults"),
    }
    debug!(?config, "Effective configuration");

    let outcome = match &cli.command {
        Command::Report(args) => run_report(config, args).await,
        Command::Seed(args) => run_seed(args).await,
    };

    match outcome {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {e}");
            Err(e.into())
        }
    }
}
