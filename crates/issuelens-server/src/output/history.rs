// SPDX-License-Identifier: Apache-2.0

use issuelens_core::{HistoryEntry, locate};
use std::io::{self, Write};

use crate::cli::OutputContext;
use crate::commands::types::HistoryResult;

use super::analysis::label_list;
use super::{Renderable, paint};

/// `owner/repo` for display, or the raw URL if it cannot be located.
fn repo_label(entry: &HistoryEntry) -> String {
    locate(&entry.repo_url).map_or_else(|_| entry.repo_url.clone(), |(o, r)| format!("{o}/{r}"))
}

fn issue_link(entry: &HistoryEntry) -> String {
    format!(
        "{}/issues/{}",
        entry.repo_url.trim_end_matches('/'),
        entry.issue_number
    )
}

impl Renderable for HistoryResult {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        if self.entries.is_empty() {
            writeln!(w)?;
            writeln!(w, "{}", paint(ctx, "No analyses yet.").yellow())?;
            writeln!(
                w,
                "Run `issuelens analyze <repo_url> <issue_number>` to get started!"
            )?;
            writeln!(w)?;
            return Ok(());
        }

        writeln!(w)?;
        writeln!(
            w,
            "{}",
            paint(ctx, format!("Analysis history ({} total):", self.entries.len())).bold()
        )?;

        for entry in &self.entries {
            writeln!(w)?;
            writeln!(
                w,
                "  {}",
                paint(ctx, format!(
                    "{} #{} ({}, Priority {})",
                    repo_label(entry),
                    entry.issue_number,
                    entry.issue_type,
                    entry.priority_score
                ))
                .green()
            )?;
            writeln!(w, "    {}", entry.summary)?;
            writeln!(
                w,
                "    Labels: {}",
                label_list(ctx, &entry.suggested_labels)
            )?;
            writeln!(w, "    Impact: {}", entry.potential_impact)?;
            writeln!(w, "    {}", paint(ctx, issue_link(entry)).dim())?;
        }
        writeln!(w)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::text_ctx;
    use issuelens_core::IssueType;

    fn entry(repo_url: &str, issue_number: u64) -> HistoryEntry {
        HistoryEntry {
            id: 1,
            repo_url: repo_url.to_string(),
            issue_number,
            summary: "Editor crashes on save".to_string(),
            issue_type: IssueType::Bug,
            priority_score: 4,
            suggested_labels: vec!["bug".to_string()],
            potential_impact: "Data loss".to_string(),
            full_json: "{}".to_string(),
            created_at: "2026-01-01T00:00:00.000000Z".to_string(),
        }
    }

    fn render(result: &HistoryResult) -> String {
        let mut out = Vec::new();
        result.render_text(&mut out, &text_ctx(false)).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_renders_headline_and_link() {
        let text = render(&HistoryResult {
            entries: vec![entry("https://github.com/acme/widgets/", 42)],
        });

        assert!(text.contains("acme/widgets #42 (bug, Priority 4)"));
        assert!(text.contains("https://github.com/acme/widgets/issues/42"));
        assert!(text.contains("Labels: bug"));
        assert!(text.contains("Impact: Data loss"));
        assert!(text.contains("1 total"));
    }

    #[test]
    fn test_empty_history_hints_at_analyze() {
        let text = render(&HistoryResult {
            entries: Vec::new(),
        });
        assert!(text.contains("No analyses yet."));
    }

    #[test]
    fn test_json_output_is_a_bare_array() {
        let result = HistoryResult {
            entries: vec![entry("https://github.com/acme/widgets", 42)],
        };
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["type"], "bug");
        assert_eq!(value[0]["suggested_labels"][0], "bug");
    }
}
