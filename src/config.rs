//! Panel configuration parsed from environment variables.
//!
//! All settings are optional. `.env` files are honored by the binary through
//! `dotenvy`; the binary reads flags and variables together through
//! [`crate::cli::Cli`], which validates them with [`PanelConfig::from_lookup`].

use std::time::Duration;

use crate::feed::{FeedOptions, StaleResponses};
use crate::gate::SubmitFailure;
use crate::panel::PanelOptions;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

pub const ENV_BACKEND_URL: &str = "HEYDOCKER_BACKEND_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "HEYDOCKER_POLL_INTERVAL_MS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "HEYDOCKER_REQUEST_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "HEYDOCKER_CONNECT_TIMEOUT_SECS";
pub const ENV_STALE_RESPONSES: &str = "HEYDOCKER_STALE_RESPONSES";
pub const ENV_SUBMIT_FAILURE: &str = "HEYDOCKER_SUBMIT_FAILURE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for TransportTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    pub backend_url: String,
    pub poll_interval_ms: u64,
    pub timeouts: TransportTimeouts,
    pub stale_responses: StaleResponses,
    pub submit_failure: SubmitFailure,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            timeouts: TransportTimeouts::default(),
            stale_responses: StaleResponses::default(),
            submit_failure: SubmitFailure::default(),
        }
    }
}

impl PanelConfig {
    /// Build typed config from the process environment.
    ///
    /// Optional:
    /// - `HEYDOCKER_BACKEND_URL`: default `http://127.0.0.1:8080`
    /// - `HEYDOCKER_POLL_INTERVAL_MS`: default 1000
    /// - `HEYDOCKER_REQUEST_TIMEOUT_SECS`: default 10
    /// - `HEYDOCKER_CONNECT_TIMEOUT_SECS`: default 5
    /// - `HEYDOCKER_STALE_RESPONSES`: `discard` (default) or `apply`
    /// - `HEYDOCKER_SUBMIT_FAILURE`: `keep_open` (default) or `close`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unparseable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unparseable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend_url = lookup(ENV_BACKEND_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let poll_interval_ms = parse_u64(&lookup, ENV_POLL_INTERVAL_MS, DEFAULT_POLL_INTERVAL_MS)?;
        if poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue { var: ENV_POLL_INTERVAL_MS, value: "0".into() });
        }
        let timeouts = TransportTimeouts {
            request_secs: parse_u64(&lookup, ENV_REQUEST_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_u64(&lookup, ENV_CONNECT_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };
        let stale_responses = parse_stale_responses(lookup(ENV_STALE_RESPONSES).as_deref())?;
        let submit_failure = parse_submit_failure(lookup(ENV_SUBMIT_FAILURE).as_deref())?;

        Ok(Self { backend_url, poll_interval_ms, timeouts, stale_responses, submit_failure })
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn panel_options(&self) -> PanelOptions {
        PanelOptions {
            feed: FeedOptions { interval: self.poll_interval(), stale_responses: self.stale_responses },
            submit_failure: self.submit_failure,
        }
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
    }
}

pub(crate) fn parse_stale_responses(raw: Option<&str>) -> Result<StaleResponses, ConfigError> {
    match raw.map(str::trim).unwrap_or("discard") {
        "discard" => Ok(StaleResponses::Discard),
        "apply" => Ok(StaleResponses::Apply),
        other => Err(ConfigError::InvalidValue { var: ENV_STALE_RESPONSES, value: other.to_string() }),
    }
}

pub(crate) fn parse_submit_failure(raw: Option<&str>) -> Result<SubmitFailure, ConfigError> {
    match raw.map(str::trim).unwrap_or("keep_open") {
        "keep_open" => Ok(SubmitFailure::KeepOpen),
        "close" => Ok(SubmitFailure::Close),
        other => Err(ConfigError::InvalidValue { var: ENV_SUBMIT_FAILURE, value: other.to_string() }),
    }
}
