// SPDX-License-Identifier: Apache-2.0

//! HTTP routes for the IssueLens API.
//!
//! The router is a thin shell over [`IssueAnalyzer`]: it decodes the request,
//! calls the analyzer, and encodes the result or a `{"detail": ...}` error.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use issuelens_core::{Analysis, HistoryEntry, IssueAnalyzer, IssueLensError, IssueRef};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Message returned by the liveness endpoint.
pub const ROOT_MESSAGE: &str = "GitHub Issue Assistant API is running";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<IssueAnalyzer>,
    detailed_status_codes: bool,
}

impl AppState {
    /// Creates handler state.
    ///
    /// With `detailed_status_codes` unset every failure is reported as 500.
    pub fn new(analyzer: Arc<IssueAnalyzer>, detailed_status_codes: bool) -> Self {
        Self {
            analyzer,
            detailed_status_codes,
        }
    }

    fn error(&self, err: &IssueLensError) -> ApiError {
        warn!(kind = err.kind(), error = %err, "Request failed");
        ApiError::from_domain(err, self.detailed_status_codes)
    }
}

/// Body of `POST /analyze-issue`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeIssueRequest {
    /// Repository URL, e.g. `https://github.com/acme/widgets`.
    pub repo_url: String,
    /// Issue number within the repository.
    pub issue_number: u64,
}

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    /// Liveness message.
    pub message: &'static str,
}

/// Error response rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    /// Maps a domain error to a response.
    ///
    /// Without `detailed` every error becomes 500. With it, each error kind
    /// gets its own status.
    #[must_use]
    pub fn from_domain(err: &IssueLensError, detailed: bool) -> Self {
        let status = if detailed {
            status_for(err)
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }

    fn from_rejection(rejection: &JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }

    /// Response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response detail text.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Status used for `err` when detailed status codes are enabled.
#[must_use]
pub fn status_for(err: &IssueLensError) -> StatusCode {
    match err {
        IssueLensError::InvalidReference { .. } => StatusCode::BAD_REQUEST,
        IssueLensError::NotFound { .. } => StatusCode::NOT_FOUND,
        IssueLensError::AccessDenied { .. } => StatusCode::FORBIDDEN,
        IssueLensError::UpstreamUnavailable { status: None, .. } => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        IssueLensError::UpstreamUnavailable { .. }
        | IssueLensError::FetchFailed { .. }
        | IssueLensError::AnalysisParse { .. } => StatusCode::BAD_GATEWAY,
        IssueLensError::Config { .. } | IssueLensError::Storage { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/analyze-issue", post(analyze_issue))
        .route("/history", get(history))
        .with_state(state)
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: ROOT_MESSAGE,
    })
}

#[instrument(skip_all)]
async fn analyze_issue(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeIssueRequest>, JsonRejection>,
) -> Result<Json<Analysis>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::from_rejection(&rejection))?;
    let issue = IssueRef::new(request.repo_url, request.issue_number)
        .map_err(|e| state.error(&e))?;

    info!(issue = %issue, "Analyze request");
    let analysis = state
        .analyzer
        .analyze_issue(&issue)
        .await
        .map_err(|e| state.error(&e))?;
    Ok(Json(analysis))
}

#[instrument(skip_all)]
async fn history(State(state): State<AppState>) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let entries = state
        .analyzer
        .get_history()
        .await
        .map_err(|e| state.error(&e))?;
    Ok(Json(entries))
}

/// Serves the API until Ctrl+C.
pub async fn run_http(host: &str, port: u16, state: AppState) -> anyhow::Result<()> {
    info!("Starting IssueLens HTTP server on {}:{}", host, port);

    // IPv6 literals need brackets
    let addr: SocketAddr = if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
    .parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down gracefully");
}
