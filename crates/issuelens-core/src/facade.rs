// SPDX-License-Identifier: Apache-2.0

//! Platform-agnostic entry points for the HTTP server and CLI.
//!
//! [`IssueAnalyzer`] composes the fetcher, the analysis backend and the
//! store into the "analyze issue" and "get history" use cases. Frontends
//! build it once and share it.

use std::sync::Arc;

use bon::Builder;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::Result;
use crate::ai::{AnalysisBackend, create_backend};
use crate::ai::types::{Analysis, IssueType};
use crate::auth::TokenProvider;
use crate::config::AppConfig;
use crate::error::IssueLensError;
use crate::github::IssueRef;
use crate::github::issues::{GitHubIssueFetcher, IssueFetcher};
use crate::store::{AnalysisRecord, AnalysisStore, SqliteAnalysisStore};

/// One row of the analysis history as exposed to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// Record id.
    pub id: i64,
    /// Repository URL as originally requested.
    pub repo_url: String,
    /// Issue number.
    pub issue_number: u64,
    /// Analysis summary.
    pub summary: String,
    /// Issue classification.
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    /// Priority 1-5.
    pub priority_score: u8,
    /// Suggested labels.
    pub suggested_labels: Vec<String>,
    /// Potential impact.
    pub potential_impact: String,
    /// Canonical analysis JSON.
    pub full_json: String,
    /// Insertion time, RFC 3339.
    pub created_at: String,
}

impl From<AnalysisRecord> for HistoryEntry {
    fn from(record: AnalysisRecord) -> Self {
        Self {
            suggested_labels: record.labels(),
            created_at: record
                .created_at
                .to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            id: record.id,
            repo_url: record.repo_url,
            issue_number: record.issue_number,
            summary: record.summary,
            issue_type: record.issue_type,
            priority_score: record.priority_score,
            potential_impact: record.potential_impact,
            full_json: record.full_json,
        }
    }
}

/// Issue analysis pipeline with a persistent cache.
#[derive(Builder)]
pub struct IssueAnalyzer {
    fetcher: Arc<dyn IssueFetcher>,
    backend: Arc<dyn AnalysisBackend>,
    store: Arc<dyn AnalysisStore>,
}

impl IssueAnalyzer {
    /// Wires the production fetcher, backend, and store.
    ///
    /// Must be called within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the LLM key is missing or a URL is invalid, and
    /// `Storage` if the database cannot be opened.
    pub fn from_config(config: &AppConfig, provider: &dyn TokenProvider) -> Result<Self> {
        let fetcher = GitHubIssueFetcher::new(&config.github, provider.github_token())?;
        let backend = create_backend(&config.ai, provider)?;
        let store = SqliteAnalysisStore::from_url(&config.database.url)?;

        info!(
            backend = backend.name(),
            model = backend.model(),
            database = %store.path().display(),
            "Issue analyzer ready"
        );

        Ok(Self::builder()
            .fetcher(Arc::new(fetcher))
            .backend(backend)
            .store(Arc::new(store))
            .build())
    }

    /// Returns the cached analysis for `issue`, or computes and stores it.
    ///
    /// A cache hit makes no network calls. On a miss the issue is fetched,
    /// analyzed, and persisted; nothing is written if any step fails.
    ///
    /// # Errors
    ///
    /// Propagates fetcher, backend, and store errors unchanged.
    #[instrument(skip(self, issue), fields(issue = %issue))]
    pub async fn analyze_issue(&self, issue: &IssueRef) -> Result<Analysis> {
        let key = issue.clone();
        if let Some(record) = self.with_store(move |store| store.find(&key)).await? {
            info!(record_id = record.id, "Cache hit");
            return record.analysis();
        }

        info!("Cache miss, analyzing");
        let fetched = self.fetcher.fetch(issue).await?;
        let analysis = self.backend.analyze(&fetched).await?;

        let key = issue.clone();
        let to_store = analysis.clone();
        let record = self
            .with_store(move |store| store.insert(&key, &to_store))
            .await?;
        debug!(record_id = record.id, "Analysis persisted");

        // A concurrent request may have stored first; its record is canonical.
        record.analysis()
    }

    /// Returns every stored analysis, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store cannot be read.
    #[instrument(skip(self))]
    pub async fn get_history(&self) -> Result<Vec<HistoryEntry>> {
        let records = self.with_store(|store| store.history()).await?;
        Ok(records.into_iter().map(HistoryEntry::from).collect())
    }

    /// Runs a store operation off the async executor.
    async fn with_store<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn AnalysisStore) -> Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| IssueLensError::Storage {
                message: format!("store task failed: {e}"),
            })?
    }
}
