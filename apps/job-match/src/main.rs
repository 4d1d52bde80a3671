mod cli;
mod config;
mod errors;
mod match_client;
mod models;
mod presenter;
mod routes;
mod session;
mod state;
mod store;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration first (fails on malformed env values)
    let config = Config::from_env()?;

    // Initialize structured logging; stdout is reserved for rendered views
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!("Starting job-match v{}", env!("CARGO_PKG_VERSION"));

    cli::run(cli, config).await
}
