// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # IssueLens Core
//!
//! Core library for IssueLens - LLM-assisted GitHub issue analysis.
//!
//! This crate provides reusable components for:
//! - Locating repositories and fetching issues from GitHub
//! - Structured issue analysis via Together AI or `OpenRouter`
//! - A SQLite cache of past analyses
//! - Configuration and credential resolution
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use issuelens_core::{ConfigTokenProvider, IssueAnalyzer, IssueRef, load_config};
//! use anyhow::Result;
//!
//! # async fn example() -> Result<()> {
//! let config = load_config(None)?;
//! let provider = ConfigTokenProvider::new(&config);
//! let analyzer = IssueAnalyzer::from_config(&config, &provider)?;
//!
//! let issue = IssueRef::new("https://github.com/acme/widgets", 42)?;
//! let analysis = analyzer.analyze_issue(&issue).await?;
//! println!("{} (priority {})", analysis.summary, analysis.priority_score);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ai`] - Analysis backends, prompts, and response parsing
//! - [`auth`] - Credential resolution
//! - [`config`] - Configuration loading and paths
//! - [`error`] - Error types
//! - [`facade`] - The analyze/history pipeline
//! - [`github`] - Repository locator and issue fetcher
//! - [`store`] - SQLite analysis cache

// ============================================================================
// Authentication
// ============================================================================

pub use auth::{ConfigTokenProvider, TokenProvider};

// ============================================================================
// Error Handling
// ============================================================================

pub use error::IssueLensError;

/// Convenience Result type for IssueLens operations.
///
/// This is equivalent to `std::result::Result<T, IssueLensError>`.
pub type Result<T> = std::result::Result<T, IssueLensError>;

// ============================================================================
// Configuration
// ============================================================================

pub use config::{
    AiConfig, AppConfig, DatabaseConfig, GitHubConfig, ServerConfig, config_dir,
    config_file_path, load_config,
};

// ============================================================================
// Issue Analysis
// ============================================================================

pub use ai::types::{Analysis, FetchedIssue, IssueType};
pub use ai::{
    AnalysisBackend, BackendKind, RawHttpBackend, StructuredClientBackend, create_backend,
    parse_analysis,
};

// ============================================================================
// GitHub Integration
// ============================================================================

pub use github::issues::{GitHubIssueFetcher, IssueFetcher};
pub use github::{IssueRef, locate};

// ============================================================================
// Storage
// ============================================================================

pub use store::{AnalysisRecord, AnalysisStore, SqliteAnalysisStore};

// ============================================================================
// Platform-Agnostic Facade
// ============================================================================

pub use facade::{HistoryEntry, IssueAnalyzer};

// ============================================================================
// Modules
// ============================================================================

pub mod ai;
pub mod auth;
pub mod config;
pub mod error;
pub mod facade;
pub mod github;
pub mod store;
