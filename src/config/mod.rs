//! Application configuration module
//!
//! Configuration is read from environment variables with the `REVENUE_DESK`
//! prefix, nested values separated by `__`. Every section has defaults, so an
//! empty environment yields a runnable development setup.
//!
//! # Example
//!
//! ```no_run
//! use revenue_desk::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod redis;
mod server;
mod storage;
mod sync;

pub use error::{ConfigError, ValidationError};
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};
pub use storage::StorageConfig;
pub use sync::RemoteSyncConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server (host, port, environment, log filter)
    #[serde(default)]
    pub server: ServerConfig,

    /// Backing store of the `/store` endpoint
    #[serde(default)]
    pub redis: RedisConfig,

    /// Local slot storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Remote sync of the slot snapshot
    #[serde(default)]
    pub sync: RemoteSyncConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// A `.env` file is read first when present.
    ///
    /// - `REVENUE_DESK__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `REVENUE_DESK__REDIS__URL=redis://...` -> `redis.url`
    /// - `REVENUE_DESK__SYNC__ENDPOINT=https://...` -> `sync.endpoint`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("REVENUE_DESK")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.redis.validate()?;
        self.storage.validate()?;
        self.sync.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use std::time::Duration;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "REVENUE_DESK__SERVER__PORT",
        "REVENUE_DESK__SERVER__ENVIRONMENT",
        "REVENUE_DESK__REDIS__URL",
        "REVENUE_DESK__STORAGE__NAMESPACE",
        "REVENUE_DESK__SYNC__ENDPOINT",
        "REVENUE_DESK__SYNC__DEBOUNCE_MS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        let config = AppConfig::load().expect("defaults should load");
        assert_eq!(config.server.port, 8080);
        assert!(!config.redis.is_configured());
        assert_eq!(config.storage.namespace, "revenue-desk-");
        assert_eq!(config.sync.endpoint(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("REVENUE_DESK__SERVER__PORT", "3000");
        env::set_var("REVENUE_DESK__REDIS__URL", "redis://localhost:6379");
        env::set_var("REVENUE_DESK__SYNC__ENDPOINT", "http://localhost:3000/api/store");
        env::set_var("REVENUE_DESK__SYNC__DEBOUNCE_MS", "500");

        let config = AppConfig::load().expect("should load");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.redis.url(), Some("redis://localhost:6379"));
        assert_eq!(config.sync.endpoint(), Some("http://localhost:3000/api/store"));
        assert_eq!(config.sync.debounce(), Duration::from_millis(500));
        assert!(config.validate().is_ok());

        clear_env();
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("REVENUE_DESK__SERVER__ENVIRONMENT", "production");

        let config = AppConfig::load().expect("should load");
        assert!(config.is_production());

        clear_env();
    }

    #[test]
    fn test_validate_rejects_bad_redis_scheme() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("REVENUE_DESK__REDIS__URL", "http://localhost:6379");

        let config = AppConfig::load().expect("should load");
        assert_eq!(config.validate(), Err(ValidationError::InvalidRedisUrl));

        clear_env();
    }

    #[test]
    fn test_validate_rejects_empty_namespace() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("REVENUE_DESK__STORAGE__NAMESPACE", "  ");

        let config = AppConfig::load().expect("should load");
        assert_eq!(config.validate(), Err(ValidationError::EmptyNamespace));

        clear_env();
    }
}
