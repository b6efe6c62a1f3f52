// SPDX-License-Identifier: Apache-2.0

//! Result types returned by command handlers.

use issuelens_core::{Analysis, HistoryEntry, IssueRef};
use serde::Serialize;

/// Result of `issuelens analyze`.
///
/// Serializes as the bare analysis, matching the HTTP API body.
#[derive(Serialize)]
pub struct AnalyzeResult {
    /// The analyzed issue.
    #[serde(skip)]
    pub issue: IssueRef,
    /// The analysis.
    #[serde(flatten)]
    pub analysis: Analysis,
}

/// Result of `issuelens history`.
#[derive(Serialize)]
#[serde(transparent)]
pub struct HistoryResult {
    /// Stored analyses, newest first.
    pub entries: Vec<HistoryEntry>,
}
