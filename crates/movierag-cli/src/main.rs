//! MovieRAG CLI - Command-line interface
//!
//! Interactive question answering over movie plots, plus commands to build
//! the index and inspect configuration.

mod cli;
mod commands;
mod config_loader;
mod errors;
mod output;
mod output_types;
mod progress;
mod session;

use clap::Parser;
use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Variables already set in the environment win over .env entries
    let dotenv = dotenvy::from_path(".env");

    // Logs go to stderr so stdout carries only command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match dotenv {
        Ok(()) => tracing::debug!("Loaded .env"),
        Err(error) if error.not_found() => {}
        Err(error) => tracing::warn!(%error, "Ignoring unreadable .env file"),
    }

    let cli = Cli::parse();

    match commands::execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            errors::from_anyhow(error).display();
            ExitCode::FAILURE
        }
    }
}
