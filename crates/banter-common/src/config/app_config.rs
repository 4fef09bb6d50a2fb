//! Application configuration structs
//!
//! Loads configuration from an optional `banter.toml` file layered under
//! environment variables (`BANTER__SECTION__KEY`). Every field has a
//! default, so an empty environment yields a working local-mode config.

use std::env;
use std::time::Duration;

use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSettings,
    pub redis: RedisConfig,
    pub cache: CacheConfig,
    pub presence: PresenceConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "banter".to_string(),
            env: Environment::default(),
        }
    }
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Redis configuration
///
/// When no URL is configured the process runs every volatile store
/// in-memory and fan-out stays process-local.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RedisConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl RedisConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

/// Permission cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Permission snapshot TTL in seconds
    pub permission_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            permission_ttl_secs: 900, // 15 minutes
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn permission_ttl(&self) -> Duration {
        Duration::from_secs(self.permission_ttl_secs)
    }
}

/// Presence and typing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// TTL on distributed presence-count keys in seconds
    pub presence_ttl_secs: u64,
    /// Typing indicator TTL in seconds; absence of renewal means stopped
    pub typing_ttl_secs: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            presence_ttl_secs: 300,
            typing_ttl_secs: 10,
        }
    }
}

impl PresenceConfig {
    #[must_use]
    pub fn presence_ttl(&self) -> Duration {
        Duration::from_secs(self.presence_ttl_secs)
    }

    #[must_use]
    pub fn typing_ttl(&self) -> Duration {
        Duration::from_secs(self.typing_ttl_secs)
    }
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SnowflakeConfig {
    pub worker_id: u16,
}

impl AppConfig {
    /// Load configuration from `banter.toml` (optional) and environment
    /// variables, environment winning. `APP_ENV` overrides the environment
    /// regardless of source.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env if present; a missing file is not an error
        let _ = dotenvy::dotenv();

        let mut cfg: Self = config::Config::builder()
            .add_source(config::File::with_name("banter").required(false))
            .add_source(config::Environment::with_prefix("BANTER").separator("__"))
            .build()?
            .try_deserialize()?;

        if let Ok(raw) = env::var("APP_ENV") {
            cfg.app.env = match raw.to_lowercase().as_str() {
                "development" => Environment::Development,
                "staging" => Environment::Staging,
                "production" => Environment::Production,
                other => {
                    return Err(ConfigError::Message(format!(
                        "unknown APP_ENV value: {other}"
                    )))
                }
            };
        }

        // REDIS_URL is the conventional override for deployments
        if let Ok(url) = env::var("REDIS_URL") {
            cfg.redis.url = Some(url);
        }

        Ok(cfg)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Message(String),

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}
