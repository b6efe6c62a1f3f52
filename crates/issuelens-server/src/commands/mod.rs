// SPDX-License-Identifier: Apache-2.0

//! Command handlers for the IssueLens CLI.

pub mod analyze;
pub mod history;
pub mod serve;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use issuelens_core::{AppConfig, ConfigTokenProvider, IssueAnalyzer};
use tracing::debug;

use crate::cli::{Commands, OutputContext};
use crate::output;

/// Builds the production analyzer from configuration.
fn build_analyzer(config: &AppConfig) -> Result<Arc<IssueAnalyzer>> {
    let provider = ConfigTokenProvider::new(config);
    let analyzer = IssueAnalyzer::from_config(config, &provider)
        .context("Failed to initialize issue analyzer")?;
    Ok(Arc::new(analyzer))
}

/// Dispatch to the appropriate command handler.
pub async fn run(command: Commands, ctx: OutputContext, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Serve { host, port } => {
            let analyzer = build_analyzer(config)?;
            serve::run(analyzer, &config.server, host, port).await
        }

        Commands::Analyze {
            repo_url,
            issue_number,
        } => {
            let analyzer = build_analyzer(config)?;
            let result = analyze::run(&analyzer, repo_url, issue_number).await?;
            debug!(issue = %result.issue, "Analysis ready");
            output::render(&result, &ctx)
        }

        Commands::History => {
            let result = history::run(config).await?;
            output::render(&result, &ctx)
        }
    }
}
