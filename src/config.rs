// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! [`ClientConfig`] the engine is wired from. Configuration is loaded from
//! the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AMS_API_BASE_URL` | Identity Service base URL | `http://localhost:8000/api/v1` |
//! | `AMS_DATA_DIR` | Directory for the durable session snapshot | `./data` |
//! | `AMS_HTTP_TIMEOUT_SECS` | Per-request timeout in whole seconds | `10` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Environment variable naming the Identity Service base URL.
pub const API_BASE_URL_ENV: &str = "AMS_API_BASE_URL";

/// Environment variable naming the session data directory.
pub const DATA_DIR_ENV: &str = "AMS_DATA_DIR";

/// Environment variable overriding the per-request timeout (whole seconds).
pub const HTTP_TIMEOUT_ENV: &str = "AMS_HTTP_TIMEOUT_SECS";

/// Default Identity Service base URL (local development server).
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Default directory for the durable session snapshot.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Default per-request timeout. Every network wait is bounded by this.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration failure raised while loading [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid Identity Service base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid {HTTP_TIMEOUT_ENV} value '{value}': expected whole seconds")]
    InvalidTimeout { value: String },
}

/// Engine configuration: where the Identity Service lives, how long to wait
/// for it, and where the session snapshot is kept.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Normalized base URL (validated, no trailing slash).
    pub base_url: String,
    /// Bound on every network wait.
    pub timeout: Duration,
    /// Directory holding the durable session snapshot.
    pub data_dir: PathBuf,
}

impl ClientConfig {
    /// Build a configuration, validating and normalizing the base URL.
    pub fn new(
        base_url: impl Into<String>,
        data_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(&base_url.into())?,
            timeout: DEFAULT_HTTP_TIMEOUT,
            data_dir: data_dir.into(),
        })
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_or_default(API_BASE_URL_ENV, DEFAULT_API_BASE_URL);
        let data_dir = env_or_default(DATA_DIR_ENV, DEFAULT_DATA_DIR);
        let mut config = Self::new(base_url, data_dir)?;
        if let Some(raw) = env_optional(HTTP_TIMEOUT_ENV) {
            let secs: u64 = raw
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout { value: raw })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// Validate the base URL and strip any trailing slash so endpoint paths can
/// be appended verbatim.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidBaseUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_trailing_slash() {
        let config = ClientConfig::new("http://localhost:8000/api/v1/", "/tmp/ams").unwrap();
        assert_eq!(config.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.timeout, DEFAULT_HTTP_TIMEOUT);
    }

    #[test]
    fn new_rejects_unparseable_url() {
        let result = ClientConfig::new("not a url", "/tmp/ams");
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn new_rejects_missing_scheme() {
        // Url::parse reads "localhost" as a scheme here, so the whitelist
        // is what actually catches this class of typo.
        let result = ClientConfig::new("localhost:8000/api/v1", "/tmp/ams");
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn with_timeout_overrides_default() {
        let config = ClientConfig::new(DEFAULT_API_BASE_URL, "/tmp/ams")
            .unwrap()
            .with_timeout(Duration::from_secs(3));
        assert_eq!(config.timeout, Duration::from_secs(3));
    }
}
