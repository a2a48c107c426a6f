//! Bot configuration module.
//!
//! Configuration is loaded from environment variables. `BOT_TOKEN` and
//! `ADMIN_USER_ID` are required.

use std::env;
use std::time::Duration;

/// Admin bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram Bot API token
    pub bot_token: String,

    /// Base URL of the REST API, including `/api`
    pub backend_url: String,

    /// Telegram user ids allowed to use the bot
    pub admin_ids: Vec<i64>,

    /// Timeout for every backend request
    pub request_timeout: Duration,
}

impl BotConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token =
            var("BOT_TOKEN").ok_or_else(|| ConfigError::MissingRequired("BOT_TOKEN".to_string()))?;

        let admin_ids = var("ADMIN_USER_ID")
            .ok_or_else(|| ConfigError::MissingRequired("ADMIN_USER_ID".to_string()))?
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                id.parse::<i64>()
                    .map_err(|_| ConfigError::InvalidValue("ADMIN_USER_ID".to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if admin_ids.is_empty() {
            return Err(ConfigError::MissingRequired("ADMIN_USER_ID".to_string()));
        }

        let backend_url = var("BACKEND_API_URL")
            .unwrap_or_else(|| "http://localhost:3000/api".to_string())
            .trim_end_matches('/')
            .to_string();

        let request_timeout = var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".to_string()))?;

        Ok(BotConfig {
            bot_token,
            backend_url,
            admin_ids,
            request_timeout,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
