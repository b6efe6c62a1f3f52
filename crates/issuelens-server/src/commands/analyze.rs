// SPDX-License-Identifier: Apache-2.0

//! Single-issue analysis command.

use anyhow::Result;
use issuelens_core::{IssueAnalyzer, IssueRef};

use super::types::AnalyzeResult;

/// Analyze one issue, served from the cache when possible.
pub async fn run(
    analyzer: &IssueAnalyzer,
    repo_url: String,
    issue_number: u64,
) -> Result<AnalyzeResult> {
    let issue = IssueRef::new(repo_url, issue_number)?;
    let analysis = analyzer.analyze_issue(&issue).await?;
    Ok(AnalyzeResult { issue, analysis })
}
