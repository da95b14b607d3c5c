//! Client configuration parsed from environment variables.

use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin, without a trailing slash.
    pub base_url: String,
    pub endpoints: Endpoints,
    pub credentials_path: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `BLOG_API_URL`: backend origin, default `http://localhost:8080`
    /// - `BLOG_API_PREFIX`: path prefix for every endpoint, default empty
    /// - `BLOG_CREDENTIALS_PATH`: default `$HOME/.config/blogdesk/credentials.json`
    /// - `BLOG_REQUEST_TIMEOUT_SECS`: default 30
    /// - `BLOG_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] when the origin has no HTTP scheme.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("BLOG_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        let prefix = std::env::var("BLOG_API_PREFIX").unwrap_or_default();
        let credentials_path = std::env::var("BLOG_CREDENTIALS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_credentials_path());
        let timeouts = Timeouts {
            request_secs: env_parse_u64("BLOG_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("BLOG_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Self::new(&base_url, &prefix, credentials_path, timeouts)
    }

    /// Build config from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] when the origin has no HTTP scheme.
    pub fn new(base_url: &str, prefix: &str, credentials_path: PathBuf, timeouts: Timeouts) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            endpoints: Endpoints::with_prefix(prefix),
            credentials_path,
            timeouts,
        })
    }
}

// =============================================================================
// ENDPOINTS
// =============================================================================

/// Backend paths, all derived from a single prefix.
///
/// Deployments disagree on whether the API is mounted under `/api`, so the
/// prefix is applied uniformly instead of per endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoints {
    prefix: String,
}

impl Endpoints {
    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        let trimmed = prefix.trim().trim_end_matches('/');
        let prefix = if trimmed.is_empty() || trimmed.starts_with('/') {
            trimmed.to_owned()
        } else {
            format!("/{trimmed}")
        };
        Self { prefix }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn join(&self, path: &str) -> String {
        format!("{}{path}", self.prefix)
    }

    #[must_use]
    pub fn login(&self) -> String {
        self.join("/auth/login")
    }

    #[must_use]
    pub fn me(&self) -> String {
        self.join("/auth/me")
    }

    #[must_use]
    pub fn register(&self) -> String {
        self.join("/auth/register")
    }

    #[must_use]
    pub fn posts(&self) -> String {
        self.join("/posts")
    }

    #[must_use]
    pub fn my_posts(&self) -> String {
        self.join("/posts/mine")
    }

    #[must_use]
    pub fn post(&self, id: i64) -> String {
        self.join(&format!("/posts/{id}"))
    }

    #[must_use]
    pub fn admin_users(&self) -> String {
        self.join("/admin/users")
    }

    #[must_use]
    pub fn admin_user(&self, id: i64) -> String {
        self.join(&format!("/admin/users/{id}"))
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::InvalidBaseUrl(raw.to_owned()))
    }
}

fn default_credentials_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(|_| PathBuf::from("."));
    base.join("blogdesk").join(CREDENTIALS_FILE)
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
