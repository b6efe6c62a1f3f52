// SPDX-License-Identifier: Apache-2.0

//! Configuration management for IssueLens.
//!
//! Provides layered configuration from files and environment variables.
//! Uses XDG-compliant paths with environment variable support.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. `DATABASE_URL` (overrides `database.url`)
//! 2. Environment variables (prefix: `ISSUELENS_`)
//! 3. Config file: `~/.config/issuelens/config.toml` (or an explicit path)
//! 4. Built-in defaults
//!
//! # Examples
//!
//! ```bash
//! # Switch to the OpenRouter backend via environment variable
//! ISSUELENS_AI__BACKEND=raw_http issuelens serve
//! ```

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::ai::BackendKind;
use crate::error::IssueLensError;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Analysis store settings.
    pub database: DatabaseConfig,
    /// GitHub API settings.
    pub github: GitHubConfig,
    /// LLM backend settings.
    pub ai: AiConfig,
}

/// HTTP server settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Map error kinds to distinct HTTP statuses instead of a blanket 500.
    pub detailed_status_codes: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            detailed_status_codes: false,
        }
    }
}

/// Analysis store settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database URL: `sqlite://path`, `sqlite:path`, or a bare file path.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./db.sqlite3".to_string(),
        }
    }
}

/// GitHub API settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST API base URL (override for GitHub Enterprise).
    pub api_url: String,
    /// Personal access token; falls back to `GH_TOKEN` / `GITHUB_TOKEN`.
    pub token: Option<String>,
    /// Request timeout in seconds. Unset means no client-side timeout.
    pub timeout_seconds: Option<u64>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            timeout_seconds: None,
        }
    }
}

/// LLM backend settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Backend variant: `structured` (Together AI) or `raw_http` (`OpenRouter`).
    pub backend: BackendKind,
    /// Model identifier. Defaults per backend when unset.
    pub model: Option<String>,
    /// Chat-completion endpoint. Defaults per backend when unset.
    pub api_url: Option<String>,
    /// API key; falls back to the backend's environment variable.
    pub api_key: Option<String>,
    /// Maximum tokens for API responses.
    pub max_tokens: u32,
    /// Temperature for API requests (0.0-1.0).
    pub temperature: f32,
    /// Request timeout in seconds. Unset means no client-side timeout.
    pub timeout_seconds: Option<u64>,
    /// `HTTP-Referer` sent to `OpenRouter`; falls back to `OPENROUTER_REFERER`.
    pub referer: Option<String>,
    /// `X-Title` sent to `OpenRouter`; falls back to `OPENROUTER_TITLE`.
    pub title: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Structured,
            model: None,
            api_url: None,
            api_key: None,
            max_tokens: 1024,
            temperature: 0.2,
            timeout_seconds: None,
            referer: None,
            title: None,
        }
    }
}

impl AiConfig {
    /// Model to use, falling back to the backend default.
    #[must_use]
    pub fn resolved_model(&self) -> String {
        self.model
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.backend.default_model().to_string())
    }

    /// Endpoint to use, falling back to the backend default.
    #[must_use]
    pub fn resolved_api_url(&self) -> String {
        self.api_url
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| self.backend.default_api_url().to_string())
    }
}

/// Returns the IssueLens configuration directory.
///
/// Respects the `XDG_CONFIG_HOME` environment variable if set,
/// otherwise defaults to `~/.config/issuelens`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return PathBuf::from(xdg_config).join("issuelens");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("issuelens")
}

/// Returns the path to the default configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load application configuration.
///
/// Loads from `path` (or the default config file when `None`, which may be
/// absent) and environment variables. Environment variables use the prefix
/// `ISSUELENS_` and double underscore for nested keys
/// (e.g., `ISSUELENS_AI__MODEL`). A non-empty `DATABASE_URL` wins over
/// everything for `database.url`.
///
/// # Errors
///
/// Returns `IssueLensError::Config` if an explicit file is missing or any
/// source is invalid.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, IssueLensError> {
    let file = match path {
        Some(explicit) => File::from(explicit).required(true),
        None => File::from(config_file_path()).required(false),
    };

    let database_url = std::env::var("DATABASE_URL")
        .ok()
        .filter(|url| !url.is_empty());

    let config = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("ISSUELENS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("database.url", database_url)?
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn from_toml(config_str: &str) -> AppConfig {
        Config::builder()
            .add_source(config::File::from_str(config_str, config::FileFormat::Toml))
            .build()
            .expect("should build config")
            .try_deserialize()
            .expect("should deserialize")
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert!(!config.server.detailed_status_codes);
        assert_eq!(config.database.url, "sqlite://./db.sqlite3");
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert!(config.github.timeout_seconds.is_none());
        assert_eq!(config.ai.backend, BackendKind::Structured);
        assert_eq!(
            config.ai.resolved_model(),
            "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free"
        );
    }

    #[test]
    fn test_config_dir_ends_with_issuelens() {
        assert!(config_dir().ends_with("issuelens"));
        assert!(config_file_path().ends_with("config.toml"));
    }

    #[test]
    fn test_raw_http_backend_from_toml() {
        let config = from_toml(
            r#"
[ai]
backend = "raw_http"

[server]
detailed_status_codes = true
"#,
        );

        assert_eq!(config.ai.backend, BackendKind::RawHttp);
        assert_eq!(
            config.ai.resolved_api_url(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
        assert!(config.server.detailed_status_codes);
        // Untouched sections keep their defaults
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_explicit_model_wins_over_backend_default() {
        let config = from_toml(
            r#"
[ai]
model = "mistralai/mixtral-8x7b"
api_url = "http://localhost:9999/v1/chat/completions"
"#,
        );

        assert_eq!(config.ai.resolved_model(), "mistralai/mixtral-8x7b");
        assert_eq!(
            config.ai.resolved_api_url(),
            "http://localhost:9999/v1/chat/completions"
        );
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result = Config::builder()
            .add_source(config::File::from_str(
                "[ai]\nbackend = \"carrier-pigeon\"",
                config::FileFormat::Toml,
            ))
            .build()
            .expect("should build config")
            .try_deserialize::<AppConfig>();

        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_load_config_from_explicit_file_with_env_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("issuelens.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9000\n\n[database]\nurl = \"sqlite://from-file.db\"\n",
        )
        .expect("write config");

        // SAFETY: serialized test; no other thread reads these variables.
        unsafe {
            std::env::set_var("ISSUELENS_SERVER__HOST", "0.0.0.0");
            std::env::set_var("DATABASE_URL", "sqlite://from-env.db");
        }

        let config = load_config(Some(&path));

        unsafe {
            std::env::remove_var("ISSUELENS_SERVER__HOST");
            std::env::remove_var("DATABASE_URL");
        }

        let config = config.expect("should load");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.url, "sqlite://from-env.db");
    }

    #[test]
    #[serial]
    fn test_load_config_missing_explicit_file_fails() {
        let result = load_config(Some(Path::new("/nonexistent/issuelens.toml")));
        assert!(matches!(result, Err(IssueLensError::Config { .. })));
    }
}
