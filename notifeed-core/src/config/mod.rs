//! Configuration for the notification subsystem
//!
//! Environment-based configuration with defaults and validation. Every knob
//! has a sane default; env vars override individual fields.

use crate::core_filter::{AlertPolicy, DEFAULT_ALERT_WINDOW};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

mod error;

pub use error::ConfigError;

/// Default bound on the initial notification fetch
pub const DEFAULT_FETCH_LIMIT: usize = 20;

/// Main subsystem configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Change-feed configuration
    pub feed: FeedConfig,

    /// Alert delivery configuration
    pub alerts: AlertConfig,
}

/// Change-feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Page size for the initial most-recent-first fetch
    pub initial_fetch_limit: usize,
}

/// Alert delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Suppression policy applied to `added` deltas
    pub policy: AlertPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            feed: FeedConfig {
                initial_fetch_limit: DEFAULT_FETCH_LIMIT,
            },
            alerts: AlertConfig {
                policy: AlertPolicy::default(),
            },
        }
    }
}

impl Config {
    /// Build a configuration from the environment, falling back to defaults.
    ///
    /// Recognized variables:
    /// - `NOTIFEED_FETCH_LIMIT` - initial fetch page size
    /// - `NOTIFEED_ALERT_POLICY` - `age_window` or `since_cursor`
    /// - `NOTIFEED_ALERT_WINDOW_SECS` - window for the age_window policy
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Ok(value) = env::var("NOTIFEED_FETCH_LIMIT") {
            config.feed.initial_fetch_limit = value
                .parse()
                .map_err(|_| ConfigError::ParseError(format!("NOTIFEED_FETCH_LIMIT: {value}")))?;
        }

        let window = match env::var("NOTIFEED_ALERT_WINDOW_SECS") {
            Ok(value) => {
                let secs: u64 = value.parse().map_err(|_| {
                    ConfigError::ParseError(format!("NOTIFEED_ALERT_WINDOW_SECS: {value}"))
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => DEFAULT_ALERT_WINDOW,
        };

        if let Ok(value) = env::var("NOTIFEED_ALERT_POLICY") {
            config.alerts.policy = match value.as_str() {
                "age_window" => AlertPolicy::age_window(window),
                "since_cursor" => AlertPolicy::SinceCursor,
                other => {
                    return Err(ConfigError::InvalidValue(format!(
                        "NOTIFEED_ALERT_POLICY: {other}"
                    )))
                }
            };
        } else {
            config.alerts.policy = AlertPolicy::age_window(window);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants across all fields
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.initial_fetch_limit == 0 {
            return Err(ConfigError::ValidationFailed(
                "initial_fetch_limit must be at least 1".to_string(),
            ));
        }
        if self.feed.initial_fetch_limit > 500 {
            return Err(ConfigError::ValidationFailed(
                "initial_fetch_limit must not exceed 500".to_string(),
            ));
        }
        if let AlertPolicy::AgeWindow { window } = &self.alerts.policy {
            if window.is_zero() {
                return Err(ConfigError::ValidationFailed(
                    "alert window must be non-zero".to_string(),
                ));
            }
        }
        Ok(())
    }
}
