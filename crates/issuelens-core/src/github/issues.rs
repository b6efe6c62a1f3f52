// SPDX-License-Identifier: Apache-2.0

//! Issue fetching from the GitHub REST API.
//!
//! Uses octocrab's raw request API so every HTTP status reaches the error
//! mapping below. Retries are disabled.

use std::time::Duration;

use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::service::middleware::retry::RetryConfig;
use reqwest::header::ACCEPT;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::IssueRef;
use crate::Result;
use crate::ai::types::FetchedIssue;
use crate::config::GitHubConfig;
use crate::error::IssueLensError;

/// Source of issue content.
#[async_trait]
pub trait IssueFetcher: Send + Sync {
    /// Fetches title, body, and comment bodies of an issue.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `AccessDenied`, `UpstreamUnavailable`, or
    /// `FetchFailed` depending on how GitHub responded.
    async fn fetch(&self, issue: &IssueRef) -> Result<FetchedIssue>;
}

#[derive(Deserialize)]
struct IssuePayload {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Deserialize)]
struct CommentPayload {
    #[serde(default)]
    body: Option<String>,
}

/// Raw status and body text of one GitHub response.
struct RawResponse {
    status: u16,
    text: String,
}

/// [`IssueFetcher`] backed by the GitHub REST API.
pub struct GitHubIssueFetcher {
    client: Octocrab,
}

impl GitHubIssueFetcher {
    /// Creates a fetcher for the configured API base URL.
    ///
    /// Without a token requests are unauthenticated. Must be called within a
    /// Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the base URL is invalid, or `UpstreamUnavailable`
    /// if the client cannot be built.
    pub fn new(config: &GitHubConfig, token: Option<SecretString>) -> Result<Self> {
        let mut builder = Octocrab::builder()
            .base_uri(config.api_url.as_str())
            .map_err(|e| IssueLensError::Config {
                message: format!("Invalid GitHub API URL '{}': {e}", config.api_url),
            })?
            .add_header(ACCEPT, "application/vnd.github+json".to_string())
            .add_retry_config(RetryConfig::None);

        if let Some(secs) = config.timeout_seconds {
            let timeout = Some(Duration::from_secs(secs));
            builder = builder
                .set_connect_timeout(timeout)
                .set_read_timeout(timeout)
                .set_write_timeout(timeout);
        }

        if let Some(token) = token {
            builder = builder.personal_token(token);
        } else {
            debug!("Creating unauthenticated GitHub client");
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn get_raw(&self, route: &str) -> Result<RawResponse> {
        let response = self.client._get(route).await?;
        let status = response.status().as_u16();
        let text = self.client.body_to_string(response).await?;
        Ok(RawResponse { status, text })
    }
}

/// Maps a non-2xx GitHub response to a domain error.
fn classify(issue: &IssueRef, raw: RawResponse) -> Result<String> {
    match raw.status {
        200..=299 => Ok(raw.text),
        404 => Err(IssueLensError::NotFound {
            resource: issue.to_string(),
        }),
        403 => Err(IssueLensError::AccessDenied {
            resource: issue.to_string(),
        }),
        500..=599 => {
            warn!(status = raw.status, "GitHub server error");
            Err(IssueLensError::UpstreamUnavailable {
                service: "GitHub".to_string(),
                status: Some(raw.status),
                message: format!("HTTP {}: {}", raw.status, raw.text),
            })
        }
        status => Err(IssueLensError::FetchFailed {
            status,
            body: raw.text,
        }),
    }
}

#[async_trait]
impl IssueFetcher for GitHubIssueFetcher {
    #[instrument(skip(self, issue), fields(issue = %issue))]
    async fn fetch(&self, issue: &IssueRef) -> Result<FetchedIssue> {
        let (owner, repo) = issue.owner_repo()?;
        let number = issue.issue_number();
        let issue_route = format!("/repos/{owner}/{repo}/issues/{number}");
        let comments_route = format!("{issue_route}/comments");

        debug!("Fetching issue and comments");
        let (issue_response, comments_response) =
            tokio::join!(self.get_raw(&issue_route), self.get_raw(&comments_route));

        let issue_text = classify(issue, issue_response?)?;
        let comments_text = classify(issue, comments_response?)?;

        let payload: IssuePayload =
            serde_json::from_str(&issue_text).map_err(|_| IssueLensError::FetchFailed {
                status: 200,
                body: issue_text.clone(),
            })?;
        let comments: Vec<CommentPayload> =
            serde_json::from_str(&comments_text).map_err(|_| IssueLensError::FetchFailed {
                status: 200,
                body: comments_text.clone(),
            })?;

        let fetched = FetchedIssue::builder()
            .title(payload.title.unwrap_or_default())
            .body(payload.body.unwrap_or_default())
            .comments(
                comments
                    .into_iter()
                    .map(|c| c.body.unwrap_or_default())
                    .collect(),
            )
            .build();

        debug!(
            body_length = fetched.body.len(),
            comments = fetched.comments.len(),
            "Fetched issue"
        );
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;

    fn fetcher(server: &MockServer) -> GitHubIssueFetcher {
        let config = GitHubConfig {
            api_url: server.base_url(),
            ..GitHubConfig::default()
        };
        GitHubIssueFetcher::new(&config, None).unwrap()
    }

    fn widgets_42() -> IssueRef {
        IssueRef::new("https://github.com/acme/widgets", 42).unwrap()
    }

    fn mock_comments(server: &MockServer, body: serde_json::Value) {
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widgets/issues/42/comments");
            then.status(200).json_body(body);
        });
    }

    #[tokio::test]
    async fn test_fetch_issue_and_comments() {
        let server = MockServer::start();
        let issue_mock = server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widgets/issues/42");
            then.status(200)
                .json_body(json!({ "number": 42, "title": "Crash on save", "body": "Steps..." }));
        });
        mock_comments(
            &server,
            json!([{ "body": "Same here" }, { "body": "Fixed in #43?" }]),
        );

        let fetched = fetcher(&server).fetch(&widgets_42()).await.unwrap();

        issue_mock.assert_calls(1);
        assert_eq!(fetched.title, "Crash on save");
        assert_eq!(fetched.body, "Steps...");
        assert_eq!(fetched.comments, vec!["Same here", "Fixed in #43?"]);
    }

    #[tokio::test]
    async fn test_null_fields_default_to_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widgets/issues/42");
            then.status(200).json_body(json!({ "title": "T", "body": null }));
        });
        mock_comments(&server, json!([{ "body": null }, { "id": 7 }]));

        let fetched = fetcher(&server).fetch(&widgets_42()).await.unwrap();

        assert_eq!(fetched.body, "");
        assert_eq!(fetched.comments, vec!["", ""]);
    }

    #[tokio::test]
    async fn test_not_found_maps_to_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widgets/issues/42");
            then.status(404).json_body(json!({ "message": "Not Found" }));
        });
        mock_comments(&server, json!([]));

        let err = fetcher(&server).fetch(&widgets_42()).await.unwrap_err();
        assert!(matches!(err, IssueLensError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_forbidden_maps_to_access_denied() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widgets/issues/42");
            then.status(403).body("API rate limit exceeded");
        });
        mock_comments(&server, json!([]));

        let err = fetcher(&server).fetch(&widgets_42()).await.unwrap_err();
        assert!(matches!(err, IssueLensError::AccessDenied { .. }));
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start();
        let issue_mock = server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widgets/issues/42");
            then.status(502).body("bad gateway");
        });
        mock_comments(&server, json!([]));

        let err = fetcher(&server).fetch(&widgets_42()).await.unwrap_err();

        issue_mock.assert_calls(1);
        match err {
            IssueLensError::UpstreamUnavailable {
                status, message, ..
            } => {
                assert_eq!(status, Some(502));
                assert!(message.contains("bad gateway"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_other_status_is_fetch_failed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widgets/issues/42");
            then.status(410).body("gone");
        });
        mock_comments(&server, json!([]));

        let err = fetcher(&server).fetch(&widgets_42()).await.unwrap_err();
        match err {
            IssueLensError::FetchFailed { status, body } => {
                assert_eq!(status, 410);
                assert_eq!(body, "gone");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_comments_failure_is_classified() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widgets/issues/42");
            then.status(200).json_body(json!({ "title": "T", "body": "B" }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widgets/issues/42/comments");
            then.status(404);
        });

        let err = fetcher(&server).fetch(&widgets_42()).await.unwrap_err();
        assert!(matches!(err, IssueLensError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_fetch_failed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widgets/issues/42");
            then.status(200).json_body(json!({ "title": "T" }));
        });
        mock_comments(&server, json!({ "not": "a list" }));

        let err = fetcher(&server).fetch(&widgets_42()).await.unwrap_err();
        assert!(matches!(err, IssueLensError::FetchFailed { status: 200, .. }));
    }
}
