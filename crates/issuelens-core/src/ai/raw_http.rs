// SPDX-License-Identifier: Apache-2.0

//! `OpenRouter` backend speaking plain JSON over HTTP.
//!
//! Builds an untyped request body per call and digs the content out of the
//! untyped reply, tolerating Markdown code fences around the JSON.

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::debug;

use super::provider::{AnalysisBackend, strip_code_fence};
use super::{BackendKind, build_http_client, read_success_body};
use crate::Result;
use crate::config::AiConfig;
use crate::error::IssueLensError;

/// Default `X-Title` attribution header.
const DEFAULT_TITLE: &str = "Issue Assistant";

/// Raw HTTP client for the `OpenRouter` chat-completions API.
#[derive(Debug)]
pub struct RawHttpBackend {
    http: Client,
    api_key: SecretString,
    api_url: String,
    model: String,
    referer: String,
    title: String,
    max_tokens: u32,
    temperature: f32,
}

impl RawHttpBackend {
    /// Creates a backend with a provided API key.
    ///
    /// Attribution headers come from configuration, then `OPENROUTER_REFERER`
    /// and `OPENROUTER_TITLE`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the HTTP client cannot be created.
    pub fn with_api_key(api_key: SecretString, config: &AiConfig) -> Result<Self> {
        let referer = config
            .referer
            .clone()
            .or_else(|| env::var("OPENROUTER_REFERER").ok())
            .unwrap_or_default();
        let title = config
            .title
            .clone()
            .or_else(|| env::var("OPENROUTER_TITLE").ok())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        Ok(Self {
            http: build_http_client(config.timeout_seconds)?,
            api_key,
            api_url: config.resolved_api_url(),
            model: config.resolved_model(),
            referer,
            title,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn build_payload(&self, system: &str, user: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature
        })
    }
}

#[async_trait]
impl AnalysisBackend for RawHttpBackend {
    fn name(&self) -> &str {
        BackendKind::RawHttp.service_name()
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let payload = self.build_payload(system, user);

        let mut request = self
            .http
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .header("X-Title", &self.title);
        if !self.referer.is_empty() {
            request = request.header("HTTP-Referer", &self.referer);
        }

        let response = request.json(&payload).send().await.map_err(|e| {
            IssueLensError::UpstreamUnavailable {
                service: self.name().to_string(),
                status: None,
                message: format!("request failed: {e}"),
            }
        })?;

        let text = read_success_body(response, self.name()).await?;
        let reply: Value = serde_json::from_str(&text).map_err(|e| IssueLensError::AnalysisParse {
            message: format!("malformed {} reply: {e}", self.name()),
        })?;

        let content = reply
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| IssueLensError::AnalysisParse {
                message: format!("no content in {} response", self.name()),
            })?;

        debug!(response_length = content.len(), "Received completion");
        Ok(strip_code_fence(content).to_string())
    }
}
