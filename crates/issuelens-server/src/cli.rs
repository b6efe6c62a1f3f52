// SPDX-License-Identifier: Apache-2.0

//! Command-line interface definition for IssueLens.
//!
//! Uses clap's derive API. `serve` runs the HTTP API; `analyze` and
//! `history` run the same pipeline in-process and print the result.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for CLI results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colors (default)
    #[default]
    Text,
    /// JSON output for programmatic consumption
    Json,
}

/// Global output configuration passed to commands.
#[derive(Clone)]
pub struct OutputContext {
    /// Output format (text, json)
    pub format: OutputFormat,
    /// Whether stdout is a terminal (TTY)
    pub is_tty: bool,
}

impl OutputContext {
    /// Creates an `OutputContext` from CLI arguments.
    pub fn from_cli(format: OutputFormat) -> Self {
        Self {
            format,
            is_tty: std::io::stdout().is_terminal(),
        }
    }

    /// Returns true if colored, human-oriented output should be used.
    pub fn is_interactive(&self) -> bool {
        self.is_tty && matches!(self.format, OutputFormat::Text)
    }
}

/// IssueLens - LLM-assisted analysis of GitHub issues.
///
/// Summarizes, classifies and prioritizes issues, and remembers every
/// analysis it has produced.
#[derive(Parser)]
#[command(name = "issuelens")]
#[command(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Output format (text, json)
    #[arg(long, short = 'o', global = true, default_value = "text", value_enum)]
    pub output: OutputFormat,

    /// Enable verbose output (debug-level logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ~/.config/issuelens/config.toml)
    #[arg(long, short = 'c', global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides `server.host`)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides `server.port`)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Analyze an issue, reusing a cached result when one exists
    Analyze {
        /// Repository URL, e.g. <https://github.com/acme/widgets>
        repo_url: String,

        /// Issue number
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        issue_number: u64,
    },

    /// List every stored analysis, newest first
    History,
}
