use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{FetchError, Result};

/// Environment variable overriding [`RetryConfig::max_retries`].
pub const ENV_MAX_RETRIES: &str = "CLIPPYMAP_FETCH_MAX_RETRIES";
/// Environment variable overriding [`RetryConfig::base_delay_ms`].
pub const ENV_BASE_DELAY_MS: &str = "CLIPPYMAP_FETCH_BASE_DELAY_MS";
/// Environment variable overriding [`RetryConfig::show_toast`].
pub const ENV_SHOW_TOAST: &str = "CLIPPYMAP_FETCH_SHOW_TOAST";

/// Configures rate-limit retry behavior.
///
/// Serialized with the camelCase keys used by the web frontend
/// (`maxRetries`, `baseDelay`, `showToast`). Missing keys take defaults.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Fallback delay in milliseconds, used when the server sends no
    /// usable `Retry-After` hint.
    #[serde(rename = "baseDelay")]
    pub base_delay_ms: u64,
    /// Whether the interactive entry point notifies the user on each retry.
    pub show_toast: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            show_toast: true,
        }
    }
}

impl RetryConfig {
    /// Sets the retry budget.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the fallback delay in milliseconds.
    pub fn base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Enables or disables retry notifications.
    pub fn show_toast(mut self, show_toast: bool) -> Self {
        self.show_toast = show_toast;
        self
    }

    /// The fallback delay as a [`Duration`].
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Parses a config from JSON, e.g. `{"maxRetries": 1, "baseDelay": 10}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| FetchError::Config(format!("invalid retry config JSON: {err}")))
    }

    /// Builds a config from environment variables, starting from defaults.
    ///
    /// Reads:
    /// - `CLIPPYMAP_FETCH_MAX_RETRIES`: non-negative integer
    /// - `CLIPPYMAP_FETCH_BASE_DELAY_MS`: non-negative integer (milliseconds)
    /// - `CLIPPYMAP_FETCH_SHOW_TOAST`: `true`/`false`/`1`/`0`
    ///
    /// Unset variables keep their default. A set but malformed variable is
    /// an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_MAX_RETRIES) {
            config.max_retries = parse_number(ENV_MAX_RETRIES, &raw)?;
        }
        if let Some(raw) = lookup(ENV_BASE_DELAY_MS) {
            config.base_delay_ms = parse_number(ENV_BASE_DELAY_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SHOW_TOAST) {
            config.show_toast = parse_flag(ENV_SHOW_TOAST, &raw)?;
        }
        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| FetchError::Config(format!("{key} must be a non-negative integer, got '{raw}'")))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(FetchError::Config(format!(
            "{key} must be a boolean, got '{raw}'"
        ))),
    }
}
