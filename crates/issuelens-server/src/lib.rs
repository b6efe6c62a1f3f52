// SPDX-License-Identifier: Apache-2.0

//! # IssueLens Server
//!
//! HTTP API and terminal client over [`issuelens_core`].
//!
//! - `POST /analyze-issue` analyzes an issue, reusing a cached result
//! - `GET /history` lists every stored analysis, newest first
//! - `GET /` reports liveness

pub mod cli;
pub mod commands;
pub mod errors;
pub mod logging;
pub mod output;
pub mod routes;

pub use routes::{AnalyzeIssueRequest, ApiError, AppState, ROOT_MESSAGE, router, run_http};
