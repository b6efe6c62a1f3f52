// SPDX-License-Identifier: Apache-2.0

use std::io::{self, Write};

use crate::cli::OutputContext;
use crate::commands::types::AnalyzeResult;

use super::{Renderable, paint};

/// Styles a 1-5 priority by urgency.
pub(super) fn styled_priority(ctx: &OutputContext, score: u8) -> String {
    let text = paint(ctx, format!("{score}/5"));
    match score {
        4.. => text.red().bold().to_string(),
        3 => text.yellow().to_string(),
        _ => text.green().to_string(),
    }
}

/// Labels joined for display, or a placeholder.
pub(super) fn label_list(ctx: &OutputContext, labels: &[String]) -> String {
    if labels.is_empty() {
        paint(ctx, "(none)").dim().to_string()
    } else {
        labels.join(", ")
    }
}

impl Renderable for AnalyzeResult {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        let analysis = &self.analysis;
        let field = |name: &'static str| paint(ctx, name).cyan();

        writeln!(w)?;
        writeln!(w, "{}", paint(ctx, format!("Analysis of {}", self.issue)).bold())?;
        writeln!(w)?;
        writeln!(w, "  {:<10} {}", field("Summary"), analysis.summary)?;
        writeln!(w, "  {:<10} {}", field("Type"), analysis.issue_type)?;
        writeln!(
            w,
            "  {:<10} {}",
            field("Priority"),
            styled_priority(ctx, analysis.priority_score)
        )?;
        writeln!(
            w,
            "  {:<10} {}",
            field("Labels"),
            label_list(ctx, &analysis.suggested_labels)
        )?;
        writeln!(w, "  {:<10} {}", field("Impact"), analysis.potential_impact)?;

        let json = serde_json::to_string_pretty(analysis).map_err(io::Error::other)?;
        writeln!(w)?;
        writeln!(w, "{}", paint(ctx, "Full analysis:").bold())?;
        writeln!(w, "{json}")?;
        Ok(())
    }
}
