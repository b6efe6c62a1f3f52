// SPDX-License-Identifier: Apache-2.0

//! GitHub integration module.
//!
//! Locates repositories from user-supplied URLs and fetches issue content.

use std::fmt;

use tracing::debug;
use url::Url;

use crate::error::IssueLensError;

pub mod issues;

/// Extracts `(owner, repo)` from a repository URL.
///
/// Accepts absolute URLs (`https://github.com/acme/widgets`) as well as
/// scheme-less input (`github.com/acme/widgets`, `acme/widgets`), in which
/// case everything before `?` or `#` is treated as the path. The last two
/// non-empty path segments are returned.
///
/// # Errors
///
/// Returns `IssueLensError::InvalidReference` if the path has fewer than two
/// non-empty segments.
pub fn locate(repo_url: &str) -> Result<(String, String), IssueLensError> {
    let trimmed = repo_url.trim();
    let path = match Url::parse(trimmed) {
        Ok(url) => url.path().to_string(),
        Err(_) => trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let [.., owner, repo] = segments.as_slice() else {
        return Err(IssueLensError::InvalidReference {
            message: format!(
                "repository URL must contain owner and repo path segments.\n\
                 Expected: https://github.com/owner/repo\n\
                 Got: {repo_url}"
            ),
        });
    };

    debug!(owner = %owner, repo = %repo, "Located repository");
    Ok(((*owner).to_string(), (*repo).to_string()))
}

/// Identity of an issue: the repository URL as given plus the issue number.
///
/// The pair is also the cache key, so `repo_url` is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueRef {
    repo_url: String,
    issue_number: u64,
}

impl IssueRef {
    /// Validates and builds a reference.
    ///
    /// # Errors
    ///
    /// Returns `IssueLensError::InvalidReference` if the URL cannot be located
    /// or the issue number is zero.
    pub fn new(repo_url: impl Into<String>, issue_number: u64) -> Result<Self, IssueLensError> {
        let repo_url = repo_url.into();
        locate(&repo_url)?;
        if issue_number == 0 {
            return Err(IssueLensError::InvalidReference {
                message: "issue number must be a positive integer".to_string(),
            });
        }
        Ok(Self {
            repo_url,
            issue_number,
        })
    }

    /// Repository URL exactly as supplied.
    #[must_use]
    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    /// Issue number.
    #[must_use]
    pub fn issue_number(&self) -> u64 {
        self.issue_number
    }

    /// Owner and repository name.
    ///
    /// # Errors
    ///
    /// Never fails for a reference built through [`IssueRef::new`].
    pub fn owner_repo(&self) -> Result<(String, String), IssueLensError> {
        locate(&self.repo_url)
    }
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match locate(&self.repo_url) {
            Ok((owner, repo)) => write!(f, "{owner}/{repo}#{}", self.issue_number),
            Err(_) => write!(f, "{}#{}", self.repo_url, self.issue_number),
        }
    }
}
