// SPDX-License-Identifier: Apache-2.0

//! Analysis backend trait and shared implementations.
//!
//! Defines the `AnalysisBackend` trait that every LLM backend implements,
//! along with the shared prompt building and response parsing.

use std::fmt::Write;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::types::{Analysis, FetchedIssue, IssueType, KNOWN_LABELS};
use crate::Result;
use crate::error::IssueLensError;

/// An LLM service able to turn issue content into an [`Analysis`].
///
/// Implementors only provide transport via [`complete`](Self::complete);
/// prompt construction and parsing are shared.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Returns the backend name for logging and error messages.
    fn name(&self) -> &str;

    /// Returns the model identifier.
    fn model(&self) -> &str;

    /// Sends one system + user exchange and returns the raw content text.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamUnavailable` on transport failure or a non-success
    /// status, and `AnalysisParse` if the reply carries no content.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Analyzes fetched issue content.
    ///
    /// # Errors
    ///
    /// Propagates [`complete`](Self::complete) errors and returns
    /// `AnalysisParse` if the content is not a valid analysis.
    #[instrument(skip(self, issue), fields(backend = %self.name(), model = %self.model()))]
    async fn analyze(&self, issue: &FetchedIssue) -> Result<Analysis> {
        let system = build_system_prompt();
        let user = build_user_prompt(issue);
        debug!(
            prompt_length = user.len(),
            comments = issue.comments.len(),
            "Calling {} API",
            self.name()
        );

        let content = self.complete(&system, &user).await?;
        debug!(response_length = content.len(), "Received LLM response");

        let analysis = parse_analysis(&content)?;
        debug!(
            issue_type = %analysis.issue_type,
            priority_score = analysis.priority_score,
            labels = analysis.suggested_labels.len(),
            "Analysis complete"
        );
        Ok(analysis)
    }
}

/// Builds the system prompt describing the analysis schema.
#[must_use]
pub fn build_system_prompt() -> String {
    let types = IssueType::ALL
        .iter()
        .map(|t| format!("\"{t}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let labels = KNOWN_LABELS
        .iter()
        .map(|l| format!("  \"{l}\""))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "You are a GitHub Issue Assistant. Given an issue's title, body, and comments,\n\
         analyze it and return a JSON with the following fields:\n\n\
         - summary: a concise summary of the issue\n\
         - type: one of [{types}]\n\
         - priority_score: number between 1 (low) and 5 (critical)\n\
         - suggested_labels: array of relevant labels (strings), preferring standard GitHub labels like [\n\
         {labels}\n\
         ]\n\
         - potential_impact: brief description of what this issue could affect\n\n\
         Respond ONLY with a valid JSON object, nothing else."
    )
}

/// Builds the user prompt containing the issue content.
#[must_use]
pub fn build_user_prompt(issue: &FetchedIssue) -> String {
    let mut prompt = String::new();

    prompt.push_str("<issue_content>\n");
    let _ = writeln!(prompt, "Title: {}", issue.title);
    let _ = writeln!(prompt, "Body: {}", issue.body);
    prompt.push_str("Comments:\n");
    if issue.comments.is_empty() {
        prompt.push_str("No comments\n");
    } else {
        for comment in &issue.comments {
            let _ = writeln!(prompt, "- {comment}");
        }
    }
    prompt.push_str("</issue_content>");

    prompt
}

/// Removes a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````).
///
/// Text without a fence is returned trimmed.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Parses LLM content into an [`Analysis`].
///
/// Enforces the 1-5 priority range and deduplicates labels keeping
/// first-seen order.
///
/// # Errors
///
/// Returns `AnalysisParse` if the content is not JSON, a field is missing
/// or mistyped, or the priority is out of range.
pub fn parse_analysis(content: &str) -> Result<Analysis> {
    let mut analysis: Analysis =
        serde_json::from_str(content).map_err(|e| IssueLensError::AnalysisParse {
            message: if e.is_eof() {
                format!("response was truncated: {e}")
            } else {
                e.to_string()
            },
        })?;

    if !(1..=5).contains(&analysis.priority_score) {
        return Err(IssueLensError::AnalysisParse {
            message: format!(
                "priority_score must be between 1 and 5, got {}",
                analysis.priority_score
            ),
        });
    }

    let mut seen = std::collections::HashSet::new();
    analysis
        .suggested_labels
        .retain(|label| seen.insert(label.clone()));

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestBackend {
        reply: String,
    }

    #[async_trait]
    impl AnalysisBackend for TestBackend {
        fn name(&self) -> &str {
            "test"
        }

        fn model(&self) -> &str {
            "test-model"
        }

        async fn complete(&self, system: &str, user: &str) -> Result<String> {
            assert!(system.contains("priority_score"));
            assert!(user.starts_with("<issue_content>"));
            Ok(self.reply.clone())
        }
    }

    const VALID: &str = r#"{
        "summary": "Save button crashes the editor",
        "type": "Bug",
        "priority_score": 4,
        "suggested_labels": ["bug", "UI", "bug"],
        "potential_impact": "Users lose unsaved work"
    }"#;

    #[test]
    fn test_build_system_prompt_lists_schema() {
        let prompt = build_system_prompt();
        for field in [
            "summary",
            "type",
            "priority_score",
            "suggested_labels",
            "potential_impact",
        ] {
            assert!(prompt.contains(field), "missing {field}");
        }
        assert!(prompt.contains("\"documentation\""));
        assert!(prompt.contains("\"good first issue\""));
        assert!(prompt.contains("Respond ONLY with a valid JSON object"));
    }

    #[test]
    fn test_build_user_prompt_with_comments() {
        let issue = FetchedIssue::builder()
            .title("Crash on save")
            .body("Steps: click save")
            .comments(vec!["Same here".to_string(), "+1".to_string()])
            .build();

        let prompt = build_user_prompt(&issue);
        assert_eq!(
            prompt,
            "<issue_content>\nTitle: Crash on save\nBody: Steps: click save\nComments:\n- Same here\n- +1\n</issue_content>"
        );
    }

    #[test]
    fn test_build_user_prompt_without_comments() {
        let issue = FetchedIssue::builder().title("Crash").build();
        let prompt = build_user_prompt(&issue);
        assert!(prompt.contains("Body: \n"));
        assert!(prompt.contains("Comments:\nNo comments\n"));
    }

    #[test]
    fn test_parse_analysis_valid_and_dedupes_labels() {
        let analysis = parse_analysis(VALID).unwrap();
        assert_eq!(analysis.issue_type, IssueType::Bug);
        assert_eq!(analysis.priority_score, 4);
        assert_eq!(analysis.suggested_labels, vec!["bug", "UI"]);
    }

    #[test]
    fn test_parse_analysis_rejects_non_json() {
        let err = parse_analysis("I think this is a bug.").unwrap_err();
        assert!(matches!(err, IssueLensError::AnalysisParse { .. }));
    }

    #[test]
    fn test_parse_analysis_rejects_missing_field() {
        let err = parse_analysis(r#"{"summary":"x","type":"bug","priority_score":2}"#).unwrap_err();
        assert!(matches!(err, IssueLensError::AnalysisParse { .. }));
    }

    #[test]
    fn test_parse_analysis_rejects_out_of_range_priority() {
        let content = VALID.replace("\"priority_score\": 4", "\"priority_score\": 9");
        let err = parse_analysis(&content).unwrap_err();
        assert!(err.to_string().contains("between 1 and 5"));

        let content = VALID.replace("\"priority_score\": 4", "\"priority_score\": 0");
        assert!(parse_analysis(&content).is_err());
    }

    #[test]
    fn test_parse_analysis_truncated() {
        let err = parse_analysis(r#"{"summary": "cut of"#).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```\n"), "{}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_analyze_uses_shared_prompt_and_parser() {
        let backend = TestBackend {
            reply: VALID.to_string(),
        };
        let issue = FetchedIssue::builder().title("Crash on save").build();

        let analysis = backend.analyze(&issue).await.unwrap();
        assert_eq!(analysis.summary, "Save button crashes the editor");
    }
}
