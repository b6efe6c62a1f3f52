// SPDX-License-Identifier: Apache-2.0

//! Credential resolution for GitHub and the LLM backends.
//!
//! The `TokenProvider` trait keeps credential lookup out of the pipeline so
//! tests and alternative frontends can supply their own sources.

use std::env;

use secrecy::SecretString;
use tracing::debug;

use crate::ai::BackendKind;
use crate::config::AppConfig;

/// Provides GitHub, Together AI, and `OpenRouter` credentials for API calls.
///
/// Implementations should return `None` if a credential is not available.
pub trait TokenProvider: Send + Sync {
    /// Retrieves the GitHub API token.
    ///
    /// Returns `None` for unauthenticated access.
    fn github_token(&self) -> Option<SecretString>;

    /// Retrieves the Together AI API key.
    fn together_key(&self) -> Option<SecretString>;

    /// Retrieves the `OpenRouter` API key.
    fn openrouter_key(&self) -> Option<SecretString>;

    /// Retrieves the key for the given backend.
    fn ai_key(&self, backend: BackendKind) -> Option<SecretString> {
        match backend {
            BackendKind::Structured => self.together_key(),
            BackendKind::RawHttp => self.openrouter_key(),
        }
    }
}

/// Resolves credentials from configuration first, then the environment.
///
/// - GitHub: `github.token`, `GH_TOKEN`, `GITHUB_TOKEN`
/// - LLM: `ai.api_key`, the backend variable (`TOGETHER_API_KEY` or
///   `OPENROUTER_API_KEY`), `AI_API_KEY`
#[derive(Debug, Default)]
pub struct ConfigTokenProvider {
    github_token: Option<String>,
    ai_key: Option<String>,
}

impl ConfigTokenProvider {
    /// Creates a provider seeded with the credentials present in `config`.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self {
            github_token: config.github.token.clone().filter(|t| !t.is_empty()),
            ai_key: config.ai.api_key.clone().filter(|k| !k.is_empty()),
        }
    }

    fn resolve_ai_key(&self, backend_var: &str) -> Option<SecretString> {
        if let Some(key) = &self.ai_key {
            debug!("Using LLM key from configuration");
            return Some(SecretString::from(key.clone()));
        }
        env_secret(backend_var).or_else(|| env_secret("AI_API_KEY"))
    }
}

impl TokenProvider for ConfigTokenProvider {
    fn github_token(&self) -> Option<SecretString> {
        if let Some(token) = &self.github_token {
            debug!("Using GitHub token from configuration");
            return Some(SecretString::from(token.clone()));
        }
        let token = env_secret("GH_TOKEN").or_else(|| env_secret("GITHUB_TOKEN"));
        if token.is_none() {
            debug!("No GitHub token found, using unauthenticated access");
        }
        token
    }

    fn together_key(&self) -> Option<SecretString> {
        self.resolve_ai_key(BackendKind::Structured.key_env_var())
    }

    fn openrouter_key(&self) -> Option<SecretString> {
        self.resolve_ai_key(BackendKind::RawHttp.key_env_var())
    }
}

fn env_secret(name: &str) -> Option<SecretString> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => {
            debug!(variable = name, "Resolved credential from environment");
            Some(SecretString::from(value))
        }
        _ => None,
    }
}
