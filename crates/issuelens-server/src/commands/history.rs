// SPDX-License-Identifier: Apache-2.0

//! Analysis history command.

use anyhow::{Context, Result};
use issuelens_core::{AnalysisStore, AppConfig, HistoryEntry, SqliteAnalysisStore};

use super::types::HistoryResult;

/// Show every stored analysis.
///
/// Reads the store directly: no GitHub client or LLM key is needed.
pub async fn run(config: &AppConfig) -> Result<HistoryResult> {
    let store = SqliteAnalysisStore::from_url(&config.database.url)
        .context("Failed to open analysis store")?;
    let records = tokio::task::spawn_blocking(move || store.history())
        .await
        .context("History task failed")??;
    Ok(HistoryResult {
        entries: records.into_iter().map(HistoryEntry::from).collect(),
    })
}
