// SPDX-License-Identifier: Apache-2.0

//! HTTP API command.

use std::sync::Arc;

use anyhow::Result;
use issuelens_core::{IssueAnalyzer, ServerConfig};

use crate::routes::{AppState, run_http};

/// Serve the API, with CLI flags taking precedence over configuration.
pub async fn run(
    analyzer: Arc<IssueAnalyzer>,
    config: &ServerConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let host = host.unwrap_or_else(|| config.host.clone());
    let port = port.unwrap_or(config.port);
    let state = AppState::new(analyzer, config.detailed_status_codes);
    run_http(&host, port, state).await
}
