#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;

use std::process;

use anyhow::Context;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "stowage_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "stowage_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "stowage_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "stowage_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(target: TRACING_TARGET_SHUTDOWN, tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %format_args!("{error:#}"),
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();

    let storage = cli
        .create_service()
        .context("invalid storage configuration")?;

    let command = cli.command;
    tracing::debug!(
        target: TRACING_TARGET_COMMAND,
        command = command.name(),
        "Running command"
    );

    let mut stdout = tokio::io::stdout();
    command.execute(&storage, &mut stdout).await
}
