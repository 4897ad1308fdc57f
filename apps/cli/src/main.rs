//! Fleetdesk terminal companion.
//!
//! Shares the dashboard's session model: the session lives in a local JSON
//! file and every command goes through the same store, gate and guard.

#![forbid(unsafe_code)]

mod cli_config;
mod commands;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use fleetdesk_core::{AppError, AppResult};
use fleetdesk_infrastructure::{FileSessionStorage, HttpAuthGateway};
use tracing::debug;

use crate::cli_config::{CliConfig, init_tracing};
use crate::commands::{Cli, Companion};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<String> {
    let config = CliConfig::load()?;

    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    debug!(
        api_url = %config.api_url,
        session_file = %config.session_file.display(),
        "companion configured"
    );

    let companion = Companion::new(
        Arc::new(FileSessionStorage::new(config.session_file)),
        Arc::new(HttpAuthGateway::new(http_client, config.api_url)),
    );

    companion.run(cli.command).await
}
