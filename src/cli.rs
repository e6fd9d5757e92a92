//! Command-line surface of the terminal host.
//!
//! Every setting can come from a flag or its `HEYDOCKER_*` environment
//! variable (clap's `env` support, after `dotenvy` has loaded `.env`).
//! Values stay as raw strings here and are validated in one place by
//! [`PanelConfig::from_lookup`], so a flag and its variable fail the same way.

use clap::Parser;

use crate::config::{
    ConfigError, ENV_BACKEND_URL, ENV_CONNECT_TIMEOUT_SECS, ENV_POLL_INTERVAL_MS, ENV_REQUEST_TIMEOUT_SECS,
    ENV_STALE_RESPONSES, ENV_SUBMIT_FAILURE, PanelConfig,
};

#[cfg(test)]
#[path = "cli_test.rs"]
mod cli_test;

pub const DEFAULT_ROWS: usize = 20;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "heydocker-panel", about = "HeyDocker chat log and credential panel")]
pub struct Cli {
    /// Backend base URL.
    #[arg(long, env = ENV_BACKEND_URL)]
    pub backend_url: Option<String>,

    /// Poll interval in milliseconds; must be positive.
    #[arg(long, env = ENV_POLL_INTERVAL_MS)]
    pub poll_interval_ms: Option<String>,

    /// Whole-request timeout in seconds.
    #[arg(long, env = ENV_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: Option<String>,

    /// Connect timeout in seconds.
    #[arg(long, env = ENV_CONNECT_TIMEOUT_SECS)]
    pub connect_timeout_secs: Option<String>,

    /// `discard` or `apply` out-of-order poll responses.
    #[arg(long, env = ENV_STALE_RESPONSES)]
    pub stale_responses: Option<String>,

    /// `keep_open` or `close` the settings form when submission fails.
    #[arg(long, env = ENV_SUBMIT_FAILURE)]
    pub submit_failure: Option<String>,

    /// Number of chat rows kept on screen.
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    pub rows: usize,
}

impl Cli {
    /// Raw value for one `HEYDOCKER_*` key, from its flag or variable.
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<String> {
        let value = match key {
            ENV_BACKEND_URL => &self.backend_url,
            ENV_POLL_INTERVAL_MS => &self.poll_interval_ms,
            ENV_REQUEST_TIMEOUT_SECS => &self.request_timeout_secs,
            ENV_CONNECT_TIMEOUT_SECS => &self.connect_timeout_secs,
            ENV_STALE_RESPONSES => &self.stale_responses,
            ENV_SUBMIT_FAILURE => &self.submit_failure,
            _ => return None,
        };
        value.clone()
    }

    /// Typed configuration for the panel.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for any unparseable setting,
    /// including a zero poll interval.
    pub fn panel_config(&self) -> Result<PanelConfig, ConfigError> {
        PanelConfig::from_lookup(|key| self.setting(key))
    }
}
