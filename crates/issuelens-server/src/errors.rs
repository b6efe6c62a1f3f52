// SPDX-License-Identifier: Apache-2.0

//! CLI-specific error formatting with user-friendly hints.
//!
//! Downcasts `anyhow::Error` to `IssueLensError` and appends a hint for the
//! errors a user can usually fix themselves.

use anyhow::Error;
use issuelens_core::{IssueLensError, config_file_path};

/// Formats an error for CLI display with helpful hints.
///
/// If the error is not an `IssueLensError`, returns the full context chain.
pub fn format_error(error: &Error) -> String {
    let Some(err) = error.chain().find_map(|e| e.downcast_ref::<IssueLensError>()) else {
        return format!("{error:#}");
    };

    match err {
        IssueLensError::Config { .. } => format!(
            "{err}\n\nTip: Check your config file at {}",
            config_file_path().display()
        ),
        IssueLensError::AccessDenied { .. } => {
            format!("{err}\n\nTip: Set GITHUB_TOKEN to raise the GitHub rate limit.")
        }
        IssueLensError::AnalysisParse { .. } => {
            format!("{err}\n\nTip: The model may be overloaded; try again or pick another model.")
        }
        _ => err.to_string(),
    }
}
