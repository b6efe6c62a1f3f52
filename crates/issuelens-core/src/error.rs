// SPDX-License-Identifier: Apache-2.0

//! Error types for IssueLens.
//!
//! Uses `thiserror` for deriving `std::error::Error` implementations.
//! Binaries should use `anyhow::Result` for top-level error handling.

use thiserror::Error;

/// Errors that can occur while analyzing an issue or reading history.
#[derive(Error, Debug)]
pub enum IssueLensError {
    /// Repository URL or issue number cannot identify an issue.
    #[error("Invalid issue reference: {message}")]
    InvalidReference {
        /// What was wrong with the reference.
        message: String,
    },

    /// Issue does not exist or is not visible to us.
    #[error("Issue not found: {resource} is missing, disabled, or private")]
    NotFound {
        /// The resource that returned 404 (e.g., `acme/widgets#42`).
        resource: String,
    },

    /// GitHub refused the request.
    #[error("Access denied for {resource}: forbidden or rate-limited, retry later")]
    AccessDenied {
        /// The resource that returned 403.
        resource: String,
    },

    /// Remote service failed at the transport level or with a 5xx status.
    #[error("{service} unavailable: {message}")]
    UpstreamUnavailable {
        /// Name of the remote service (`GitHub`, `together`, `openrouter`).
        service: String,
        /// HTTP status, when the remote answered at all.
        status: Option<u16>,
        /// Error message, including the upstream body text when available.
        message: String,
    },

    /// GitHub answered with a non-2xx status outside the enumerated cases.
    #[error("GitHub request failed (HTTP {status}): {body}")]
    FetchFailed {
        /// Upstream HTTP status code.
        status: u16,
        /// Upstream response body text.
        body: String,
    },

    /// LLM content was not valid JSON or did not match the analysis schema.
    #[error("Invalid analysis from LLM: {message}")]
    AnalysisParse {
        /// Parser diagnostic.
        message: String,
    },

    /// Configuration file, environment, or credential problem.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },

    /// Analysis store failure.
    #[error("Storage error: {message}")]
    Storage {
        /// Error message.
        message: String,
    },
}

impl IssueLensError {
    /// Short machine-readable name of the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            IssueLensError::InvalidReference { .. } => "invalid_reference",
            IssueLensError::NotFound { .. } => "not_found",
            IssueLensError::AccessDenied { .. } => "access_denied",
            IssueLensError::UpstreamUnavailable { .. } => "upstream_unavailable",
            IssueLensError::FetchFailed { .. } => "fetch_failed",
            IssueLensError::AnalysisParse { .. } => "analysis_parse_error",
            IssueLensError::Config { .. } => "config",
            IssueLensError::Storage { .. } => "storage",
        }
    }
}

impl From<octocrab::Error> for IssueLensError {
    fn from(err: octocrab::Error) -> Self {
        IssueLensError::UpstreamUnavailable {
            service: "GitHub".to_string(),
            status: None,
            message: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for IssueLensError {
    fn from(err: rusqlite::Error) -> Self {
        IssueLensError::Storage {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for IssueLensError {
    fn from(err: config::ConfigError) -> Self {
        IssueLensError::Config {
            message: err.to_string(),
        }
    }
}
