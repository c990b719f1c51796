use anyhow::Context;
use clap::{ArgAction, Parser};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use docchat::commands::{self, Command};
use docchat::config::{AppConfig, DEFAULT_CONFIG_PATH};
use docchat::errors::AppError;
use docchat::state::AppState;

/// Chat with an AI assistant about your PDF documents
#[derive(Parser)]
#[command(name = "docchat", version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file, without extension
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = AppConfig::load_from(&cli.config).context("Failed to load configuration")?;
    tracing::info!(
        "Configuration loaded (env: {}, api: {})",
        std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into()),
        config.api.base_url
    );

    let mut state = AppState::new(config)?;
    commands::run(cli.command, &mut state).await
}
