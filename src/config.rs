//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.
//!
//! All settings have defaults and can be overridden via environment variables,
//! typically populated from a ConfigMap using `envFrom` in the deployment.

use std::time::Duration;

use crate::runtime::RetryPolicy;

const DEFAULT_HANDLER_RETRIES: u32 = 3;
const DEFAULT_HANDLER_BACKOFF_SECS: u64 = 30;
const DEFAULT_HANDLER_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Namespace to watch; unset means all namespaces.
    pub watch_namespace: Option<String>,
    /// Additional handler attempts after the first, per event.
    pub handler_retries: u32,
    /// Fixed delay between handler attempts (seconds).
    pub handler_backoff_secs: u64,
    /// Ceiling on a single handler invocation (seconds).
    pub handler_timeout_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            watch_namespace: None,
            handler_retries: DEFAULT_HANDLER_RETRIES,
            handler_backoff_secs: DEFAULT_HANDLER_BACKOFF_SECS,
            handler_timeout_secs: DEFAULT_HANDLER_TIMEOUT_SECS,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            watch_namespace: std::env::var("WATCH_NAMESPACE")
                .ok()
                .filter(|namespace| !namespace.is_empty()),
            handler_retries: env_var_or_default("HANDLER_RETRIES", DEFAULT_HANDLER_RETRIES),
            handler_backoff_secs: env_var_or_default(
                "HANDLER_BACKOFF_SECS",
                DEFAULT_HANDLER_BACKOFF_SECS,
            ),
            handler_timeout_secs: env_var_or_default(
                "HANDLER_TIMEOUT_SECS",
                DEFAULT_HANDLER_TIMEOUT_SECS,
            ),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.handler_retries,
            backoff: Duration::from_secs(self.handler_backoff_secs),
            timeout: Duration::from_secs(self.handler_timeout_secs),
        }
    }
}

/// Read environment variable or return default value.
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
