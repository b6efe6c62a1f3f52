// SPDX-License-Identifier: Apache-2.0

//! AI request/response types and the analysis schema.
//!
//! Defines the chat-completion wire structures shared by the backends,
//! the fetched issue content fed into prompts, and the structured
//! [`Analysis`] every backend must produce.

use std::fmt;
use std::str::FromStr;

use bon::Builder;
use serde::{Deserialize, Serialize};

/// A chat message for a chat-completion API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", or "assistant".
    pub role: String,
    /// Message content.
    pub content: String,
}

/// Request body for chat completions.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier.
    pub model: String,
    /// List of messages in the conversation.
    pub messages: Vec<ChatMessage>,
    /// Forced response format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    /// Maximum tokens in response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature for response randomness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Response format for structured output.
#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    /// Type of response format ("`json_object`" for structured output).
    #[serde(rename = "type")]
    pub format_type: String,
}

/// Response from a chat completions API.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    /// List of choices (usually just one).
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// A single choice in the chat completion response.
#[derive(Debug, Deserialize)]
pub struct Choice {
    /// The generated message.
    pub message: ResponseMessage,
}

/// Generated message; providers may send `null` content.
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    /// Message content.
    #[serde(default)]
    pub content: Option<String>,
}

/// Issue content as fetched from GitHub.
///
/// Missing title, body, or comment bodies are represented as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct FetchedIssue {
    /// Issue title.
    #[builder(into, default)]
    pub title: String,
    /// Issue body (markdown content).
    #[builder(into, default)]
    pub body: String,
    /// Comment bodies in source order.
    #[builder(default)]
    pub comments: Vec<String>,
}

/// Classification of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum IssueType {
    /// Defect report.
    Bug,
    /// Feature request.
    Feature,
    /// Code restructuring.
    Refactor,
    /// Documentation change.
    Documentation,
    /// Anything else.
    Other,
}

impl IssueType {
    /// All variants, in prompt order.
    pub const ALL: [IssueType; 5] = [
        IssueType::Bug,
        IssueType::Feature,
        IssueType::Refactor,
        IssueType::Documentation,
        IssueType::Other,
    ];

    /// Lowercase wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IssueType::Bug => "bug",
            IssueType::Feature => "feature",
            IssueType::Refactor => "refactor",
            IssueType::Documentation => "documentation",
            IssueType::Other => "other",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        IssueType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                format!("unknown issue type '{s}', expected one of bug, feature, refactor, documentation, other")
            })
    }
}

impl TryFrom<String> for IssueType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Structured analysis of an issue.
///
/// Field order is the canonical serialization order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// Concise summary of the issue.
    pub summary: String,
    /// Issue classification.
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    /// Priority from 1 (low) to 5 (critical).
    pub priority_score: u8,
    /// Suggested labels, unique, in first-seen order.
    pub suggested_labels: Vec<String>,
    /// What the issue could affect.
    pub potential_impact: String,
}

/// Labels the system prompt steers the model toward.
///
/// Not enforced on responses.
pub const KNOWN_LABELS: [&str; 22] = [
    "bug",
    "feature",
    "enhancement",
    "refactor",
    "documentation",
    "test",
    "chore",
    "UI",
    "backend",
    "database",
    "API",
    "login-flow",
    "security",
    "performance",
    "good first issue",
    "help wanted",
    "in progress",
    "blocked",
    "ready for review",
    "wontfix",
    "duplicate",
    "question",
];
