// SPDX-License-Identifier: Apache-2.0

//! Output rendering for CLI commands.
//!
//! Command handlers return data; this module handles presentation in text
//! or JSON.

use anyhow::{Context, Result};
use console::{StyledObject, style};
use serde::Serialize;
use std::io::{self, Write};

use crate::cli::{OutputContext, OutputFormat};

mod analysis;
mod history;

/// Trait for types that can be rendered in multiple output formats.
pub trait Renderable: Serialize {
    /// Render as human-readable text to the given writer.
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()>;
}

/// Styles `value` only when output goes to an interactive terminal.
pub(crate) fn paint<D>(ctx: &OutputContext, value: D) -> StyledObject<D> {
    style(value).force_styling(ctx.is_interactive())
}

/// Generic render function - handles JSON via serde, delegates text to the trait.
pub fn render<T: Renderable>(result: &T, ctx: &OutputContext) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(result).context("Failed to serialize to JSON")?;
            println!("{json}");
        }
        OutputFormat::Text => {
            result
                .render_text(&mut io::stdout(), ctx)
                .context("Failed to render text")?;
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn text_ctx(is_tty: bool) -> OutputContext {
    OutputContext {
        format: OutputFormat::Text,
        is_tty,
    }
}
