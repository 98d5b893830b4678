// src/config.rs
// =============================================================================
// Process configuration, read from environment variables.
//
//   GREPTILE_API_URL              base URL of the indexing service (required)
//   GREPTILE_API_KEY              bearer credential (required)
//   GITHUB_TOKEN                  forwarded as X-Github-Token (optional)
//   DRAGONS_POLL_INTERVAL_MS      wait between status checks (default 5000)
//   DRAGONS_MAX_POLL_ATTEMPTS     status checks before giving up (default 48)
//   DRAGONS_REQUEST_TIMEOUT_SECS  per-request transport timeout (default 120)
//
// Command-line flags can override the polling values afterwards, so
// validate() is a separate step that main runs once everything is applied.
// =============================================================================

use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 48;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the indexing service, without a trailing slash
    pub api_url: String,
    pub api_key: String,
    pub github_token: Option<String>,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as from_env, with the variable lookup supplied by the caller
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = get("GREPTILE_API_URL").ok_or(ConfigError::Missing("GREPTILE_API_URL"))?;
        let api_key = get("GREPTILE_API_KEY").ok_or(ConfigError::Missing("GREPTILE_API_KEY"))?;

        let poll_interval_ms = parse_or(
            "DRAGONS_POLL_INTERVAL_MS",
            get("DRAGONS_POLL_INTERVAL_MS"),
            DEFAULT_POLL_INTERVAL_MS,
        )?;
        let max_poll_attempts = parse_or(
            "DRAGONS_MAX_POLL_ATTEMPTS",
            get("DRAGONS_MAX_POLL_ATTEMPTS"),
            DEFAULT_MAX_POLL_ATTEMPTS,
        )?;
        let request_timeout_secs = parse_or(
            "DRAGONS_REQUEST_TIMEOUT_SECS",
            get("DRAGONS_REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Self {
            api_url: api_url.trim().trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            github_token: get("GITHUB_TOKEN").map(|t| t.trim().to_string()),
            poll_interval: Duration::from_millis(poll_interval_ms),
            max_poll_attempts,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }

    /// Checks the settings that can't be sanity-checked while parsing
    pub fn validate(&self) -> Result<(), ConfigError> {
        match Url::parse(&self.api_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            _ => {
                return Err(ConfigError::Invalid {
                    key: "GREPTILE_API_URL",
                    value: self.api_url.clone(),
                    reason: "expected an http(s) URL",
                })
            }
        }

        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid {
                key: "DRAGONS_POLL_INTERVAL_MS",
                value: "0".to_string(),
                reason: "must be greater than zero",
            });
        }

        if self.max_poll_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "DRAGONS_MAX_POLL_ATTEMPTS",
                value: "0".to_string(),
                reason: "must be greater than zero",
            });
        }

        if self
            .poll_interval
            .checked_mul(self.max_poll_attempts)
            .is_none()
        {
            return Err(ConfigError::Invalid {
                key: "DRAGONS_POLL_INTERVAL_MS",
                value: self.poll_interval.as_millis().to_string(),
                reason: "total polling time is too long",
            });
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "DRAGONS_REQUEST_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "must be greater than zero",
            });
        }

        Ok(())
    }

    /// Longest we'll wait for indexing before reporting a timeout
    pub fn max_wait(&self) -> Duration {
        self.poll_interval.saturating_mul(self.max_poll_attempts)
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value,
            reason: "expected a whole number",
        }),
    }
}
