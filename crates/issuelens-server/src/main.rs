// SPDX-License-Identifier: Apache-2.0

//! IssueLens - LLM-assisted analysis of GitHub issues.

use anyhow::{Context, Result};
use clap::Parser;
use issuelens_core::load_config;
use issuelens_server::cli::{Cli, OutputContext};
use issuelens_server::{commands, errors, logging};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let output_ctx = OutputContext::from_cli(cli.output);

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    debug!("Configuration loaded successfully");

    match commands::run(cli.command, output_ctx, &config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let formatted = errors::format_error(&e);
            eprintln!("Error: {formatted}");
            Err(e)
        }
    }
}
