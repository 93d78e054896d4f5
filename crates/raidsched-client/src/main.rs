//! raidsched CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use raidsched_client::cli::{Cli, Command, ConfigAction};
use raidsched_client::commands;
use raidsched_client::config::ClientConfig;
use raidsched_client::error::{ClientError, ClientResult};
use raidsched_core::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.tracing_config()) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let ClientError::Sync(ref err) = e {
                tracing::error!(kind = ?err.kind(), phase = ?err.phase(), "run aborted");
            }
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path),
        None => ClientConfig::load(),
    }
    .map_err(ClientError::Config)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => commands::run::run(&config).await,
        Command::Plan { json } => commands::plan::plan(&config, json).await,
        Command::Export => commands::export::export(&config).await,
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
