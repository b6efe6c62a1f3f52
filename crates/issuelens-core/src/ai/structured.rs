// SPDX-License-Identifier: Apache-2.0

//! Together AI backend using typed chat-completion models.
//!
//! Requests JSON-object output and takes the first choice's content as the
//! raw analysis JSON.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::provider::AnalysisBackend;
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat};
use super::{BackendKind, build_http_client, read_success_body};
use crate::Result;
use crate::config::AiConfig;
use crate::error::IssueLensError;

/// Typed client for the Together AI chat-completions API.
///
/// Holds the HTTP client and model settings for reuse across requests.
#[derive(Debug)]
pub struct StructuredClientBackend {
    http: Client,
    api_key: SecretString,
    api_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl StructuredClientBackend {
    /// Creates a backend with a provided API key.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the HTTP client cannot be created.
    pub fn with_api_key(api_key: SecretString, config: &AiConfig) -> Result<Self> {
        Ok(Self {
            http: build_http_client(config.timeout_seconds)?,
            api_key,
            api_url: config.resolved_api_url(),
            model: config.resolved_model(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn build_request(&self, system: &str, user: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            response_format: Some(ResponseFormat {
                format_type: "json_object".to_string(),
            }),
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        }
    }
}

#[async_trait]
impl AnalysisBackend for StructuredClientBackend {
    fn name(&self) -> &str {
        BackendKind::Structured.service_name()
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = self.build_request(system, user);

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| IssueLensError::UpstreamUnavailable {
                service: self.name().to_string(),
                status: None,
                message: format!("request failed: {e}"),
            })?;

        let text = read_success_body(response, self.name()).await?;
        let completion: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| IssueLensError::AnalysisParse {
                message: format!("malformed {} completion: {e}", self.name()),
            })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| IssueLensError::AnalysisParse {
                message: format!("no content in {} response", self.name()),
            })?;

        debug!(response_length = content.len(), "Received completion");
        Ok(content)
    }
}
