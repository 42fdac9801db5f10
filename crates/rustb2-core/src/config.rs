//! Client configuration.
//!
//! Provides [`B2Config`] for configuring the rustb2 client. Configuration
//! values are loaded from environment variables, falling back to defaults
//! that match the service's documented behavior.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::{B2Error, B2Result};
use crate::types::Credentials;

/// Base URL for the account authorization call.
pub const DEFAULT_AUTH_URL: &str = "https://api.backblazeb2.com/";

/// Assumed lifetime of an authorization token. The service does not return
/// an expiry, only the documented upper bound of 24 hours.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;

/// Number of concurrent part uploads per large file.
pub const DEFAULT_UPLOAD_WORKERS: usize = 4;

/// rustb2 client configuration.
///
/// # Examples
///
/// ```
/// use rustb2_core::B2Config;
///
/// let config = B2Config::default();
/// assert_eq!(config.upload_workers, 4);
/// assert_eq!(config.token_ttl_secs, 86_400);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct B2Config {
    /// Application key ID.
    #[builder(default)]
    pub key_id: String,

    /// Application key secret. Never serialized.
    #[builder(default)]
    #[serde(skip_serializing, default)]
    pub key_secret: String,

    /// Base URL of the account authorization endpoint.
    #[builder(default = String::from(DEFAULT_AUTH_URL))]
    pub auth_url: String,

    /// Keep the session in memory only instead of the on-disk cache.
    #[builder(default = false)]
    pub no_cache: bool,

    /// Directory holding `cache.json`. Resolved from XDG/HOME when unset.
    #[builder(default)]
    pub cache_dir: Option<String>,

    /// Lifetime assumed for a freshly issued authorization token.
    #[builder(default = DEFAULT_TOKEN_TTL_SECS)]
    pub token_ttl_secs: u64,

    /// Number of concurrent part upload workers.
    #[builder(default = DEFAULT_UPLOAD_WORKERS)]
    pub upload_workers: usize,

    /// How many times one part may be re-sent after a retryable failure.
    #[builder(default = 0)]
    pub part_retry_budget: u32,

    /// TCP connect timeout in seconds.
    #[builder(default = 10)]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds.
    #[builder(default = 300)]
    pub request_timeout_secs: u64,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for B2Config {
    fn default() -> Self {
        Self {
            key_id: String::new(),
            key_secret: String::new(),
            auth_url: String::from(DEFAULT_AUTH_URL),
            no_cache: false,
            cache_dir: None,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            upload_workers: DEFAULT_UPLOAD_WORKERS,
            part_retry_budget: 0,
            connect_timeout_secs: 10,
            request_timeout_secs: 300,
            log_level: String::from("info"),
        }
    }
}

impl B2Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `B2_KEY_ID` | *(empty)* |
    /// | `B2_KEY_SECRET` | *(empty)* |
    /// | `B2_AUTH_URL` | `https://api.backblazeb2.com/` |
    /// | `B2_NO_CACHE` | *(unset)*, any value other than `0`/`false` disables the disk cache |
    /// | `B2_CACHE_DIR` | `$XDG_CACHE_HOME/b2` or `$HOME/.cache/b2` |
    /// | `B2_TOKEN_TTL_SECS` | `86400` |
    /// | `B2_UPLOAD_WORKERS` | `4` |
    /// | `B2_PART_RETRIES` | `0` |
    /// | `B2_CONNECT_TIMEOUT_SECS` | `10` |
    /// | `B2_REQUEST_TIMEOUT_SECS` | `300` |
    /// | `LOG_LEVEL` | `info` |
    ///
    /// Unparseable numbers keep their default.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("B2_KEY_ID") {
            config.key_id = v;
        }
        if let Ok(v) = std::env::var("B2_KEY_SECRET") {
            config.key_secret = v;
        }
        if let Ok(v) = std::env::var("B2_AUTH_URL") {
            config.auth_url = v;
        }
        if let Ok(v) = std::env::var("B2_NO_CACHE") {
            config.no_cache = !(v == "0" || v.eq_ignore_ascii_case("false"));
        }
        if let Ok(v) = std::env::var("B2_CACHE_DIR") {
            config.cache_dir = Some(v);
        }
        parse_env("B2_TOKEN_TTL_SECS", &mut config.token_ttl_secs);
        parse_env("B2_UPLOAD_WORKERS", &mut config.upload_workers);
        parse_env("B2_PART_RETRIES", &mut config.part_retry_budget);
        parse_env("B2_CONNECT_TIMEOUT_SECS", &mut config.connect_timeout_secs);
        parse_env("B2_REQUEST_TIMEOUT_SECS", &mut config.request_timeout_secs);
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// The application key pair.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.key_id.clone(), self.key_secret.clone())
    }

    /// Token lifetime as a [`Duration`].
    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    /// Number of upload workers, never less than one.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.upload_workers.max(1)
    }

    /// Directory for the on-disk session cache.
    pub fn cache_path(&self) -> B2Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = std::env::var_os("XDG_CACHE_HOME").filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir).join("b2"));
        }
        std::env::var_os("HOME")
            .filter(|v| !v.is_empty())
            .map(|home| PathBuf::from(home).join(".cache").join("b2"))
            .ok_or_else(|| B2Error::Config("cannot locate a cache directory".to_owned()))
    }

    /// Reject configurations that cannot possibly authorize.
    pub fn validate(&self) -> B2Result<()> {
        if self.credentials().is_incomplete() {
            return Err(B2Error::Config(
                "B2_KEY_ID and B2_KEY_SECRET must both be set".to_owned(),
            ));
        }
        if self.token_ttl_secs == 0 {
            return Err(B2Error::Config("token TTL must be positive".to_owned()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, slot: &mut T) {
    if let Ok(v) = std::env::var(name) {
        if let Ok(n) = v.parse::<T>() {
            *slot = n;
        }
    }
}
