//! Remote sync configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Remote sync settings. Sync is off when no endpoint is set.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSyncConfig {
    /// Full URL of the `/store` endpoint
    pub endpoint: Option<String>,

    /// Quiet period before an upload, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl RemoteSyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().filter(|e| !e.trim().is_empty())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.debounce_ms == 0 || self.debounce_ms > 60_000 {
            return Err(ValidationError::InvalidDebounce);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if let Some(endpoint) = self.endpoint() {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ValidationError::InvalidSyncEndpoint);
            }
        }
        Ok(())
    }
}

impl Default for RemoteSyncConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            debounce_ms: default_debounce_ms(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    2000
}

fn default_timeout() -> u64 {
    10
}
