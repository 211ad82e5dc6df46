//! Linkhub - command-line client for the link-sharing dashboard API.

mod cli;
mod commands;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use linkhub_application::{ApiClient, ApiError, TokenStore};
use linkhub_infrastructure::{
    JsonFileStore, ReqwestHttpClient, SystemClock, default_session_file, load_client_config,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

/// Exit status when the session cannot be renewed and the user must log in again.
const EXIT_SESSION_EXPIRED: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if error
                .downcast_ref::<ApiError>()
                .is_some_and(ApiError::is_session_expired)
            {
                eprintln!("Session expired ({error}). Run `linkhub login` to sign in again.");
                ExitCode::from(EXIT_SESSION_EXPIRED)
            } else {
                eprintln!("error: {error:#}");
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config =
        load_client_config(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
        config.validate()?;
    }
    config.debug |= cli.verbose;
    init_tracing(config.debug);

    let session_file = cli
        .session_file
        .or_else(default_session_file)
        .context("cannot determine where to store the session, pass --session-file")?;
    tracing::debug!(path = %session_file.display(), "using session file");

    let store = Arc::new(JsonFileStore::new(session_file));
    let tokens = Arc::new(TokenStore::from_config(store, Arc::new(SystemClock::new()), &config));
    let http = Arc::new(ReqwestHttpClient::new()?);
    let client = Arc::new(ApiClient::new(config, http, tokens));

    commands::execute(cli.command, client).await
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "warn,linkhub=debug,linkhub_application=debug,linkhub_infrastructure=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
