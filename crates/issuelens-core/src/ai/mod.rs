// SPDX-License-Identifier: Apache-2.0

//! AI integration module.
//!
//! Turns fetched issue content into a structured [`Analysis`] through one of
//! two interchangeable LLM backends.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub mod provider;
pub mod raw_http;
pub mod structured;
pub mod types;

pub use provider::{AnalysisBackend, parse_analysis};
pub use raw_http::RawHttpBackend;
pub use structured::StructuredClientBackend;
pub use types::{Analysis, FetchedIssue, IssueType, KNOWN_LABELS};

use crate::Result;
use crate::auth::TokenProvider;
use crate::config::AiConfig;
use crate::error::IssueLensError;

/// Together AI chat-completions endpoint.
pub const TOGETHER_API_URL: &str = "https://api.together.xyz/v1/chat/completions";

/// `OpenRouter` chat-completions endpoint.
pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Which LLM backend performs analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Typed client against Together AI.
    #[default]
    Structured,
    /// Untyped HTTP against `OpenRouter`.
    RawHttp,
}

impl BackendKind {
    /// Service name used in logs and errors.
    #[must_use]
    pub fn service_name(self) -> &'static str {
        match self {
            BackendKind::Structured => "together",
            BackendKind::RawHttp => "openrouter",
        }
    }

    /// Default model identifier.
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            BackendKind::Structured => "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free",
            BackendKind::RawHttp => "deepseek/deepseek-r1-0528-qwen3-8b:free",
        }
    }

    /// Default chat-completions endpoint.
    #[must_use]
    pub fn default_api_url(self) -> &'static str {
        match self {
            BackendKind::Structured => TOGETHER_API_URL,
            BackendKind::RawHttp => OPENROUTER_API_URL,
        }
    }

    /// Environment variable holding the API key.
    #[must_use]
    pub fn key_env_var(self) -> &'static str {
        match self {
            BackendKind::Structured => "TOGETHER_API_KEY",
            BackendKind::RawHttp => "OPENROUTER_API_KEY",
        }
    }
}

/// Creates the configured backend.
///
/// # Errors
///
/// Returns `Config` if no API key resolves for the selected backend or the
/// HTTP client cannot be created.
pub fn create_backend(
    config: &AiConfig,
    provider: &dyn TokenProvider,
) -> Result<Arc<dyn AnalysisBackend>> {
    let kind = config.backend;
    let api_key = provider
        .ai_key(kind)
        .ok_or_else(|| IssueLensError::Config {
            message: format!(
                "Missing API key for the {} backend.\n\
                 Set {} (or AI_API_KEY), or `ai.api_key` in {}",
                kind.service_name(),
                kind.key_env_var(),
                crate::config::config_file_path().display()
            ),
        })?;

    debug!(backend = kind.service_name(), model = %config.resolved_model(), "Creating analysis backend");
    let backend: Arc<dyn AnalysisBackend> = match kind {
        BackendKind::Structured => Arc::new(StructuredClientBackend::with_api_key(api_key, config)?),
        BackendKind::RawHttp => Arc::new(RawHttpBackend::with_api_key(api_key, config)?),
    };
    Ok(backend)
}

/// Builds an HTTP client, with a request timeout only when configured.
pub(crate) fn build_http_client(timeout_seconds: Option<u64>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(secs) = timeout_seconds {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().map_err(|e| IssueLensError::Config {
        message: format!("Failed to create HTTP client: {e}"),
    })
}

/// Returns the body of a successful response.
///
/// Non-success statuses become `UpstreamUnavailable` carrying the body text.
pub(crate) async fn read_success_body(response: reqwest::Response, service: &str) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| IssueLensError::UpstreamUnavailable {
            service: service.to_string(),
            status: Some(status.as_u16()),
            message: format!("failed to read response body: {e}"),
        })?;

    if !status.is_success() {
        warn!(service, status = status.as_u16(), "LLM request failed");
        return Err(IssueLensError::UpstreamUnavailable {
            service: service.to_string(),
            status: Some(status.as_u16()),
            message: format!("{service} API error (HTTP {}): {body}", status.as_u16()),
        });
    }

    Ok(body)
}
