//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. `main` loads a `.env` file first when one exists.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// REST API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP port
    pub port: u16,

    /// Interface to bind
    pub bind_addr: IpAddr,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// Bot token used to verify Telegram WebApp init data.
    /// Without it every order request is rejected.
    pub telegram_bot_token: Option<String>,

    /// Allowed CORS origin; any origin when unset
    pub frontend_url: Option<String>,
}

impl ApiConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_path = var("DATABASE_PATH")
            .or_else(|| var("DATABASE_URL").map(|url| strip_sqlite_scheme(&url)))
            .unwrap_or_else(|| "assorti.db".to_string());

        Ok(ApiConfig {
            port: var("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            bind_addr: var("BIND_ADDR")
                .unwrap_or_else(|| "0.0.0.0".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BIND_ADDR".to_string()))?,

            database_path: PathBuf::from(database_path),

            db_max_connections: var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?,

            telegram_bot_token: var("TELEGRAM_BOT_TOKEN"),

            frontend_url: var("FRONTEND_URL"),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

/// Accepts `sqlite://file.db`, `sqlite:file.db` or a bare path.
fn strip_sqlite_scheme(url: &str) -> String {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);

    path.split('?').next().unwrap_or(path).to_string()
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
        assert_eq!(config.database_path, PathBuf::from("assorti.db"));
        assert_eq!(config.db_max_connections, 5);
        assert!(config.telegram_bot_token.is_none());
    }

    #[test]
    fn test_database_url_scheme_is_stripped() {
        let config = load(&[("DATABASE_URL", "sqlite://data/shop.db?mode=rwc")]).unwrap();
        assert_eq!(config.database_path, PathBuf::from("data/shop.db"));

        let config = load(&[
            ("DATABASE_URL", "sqlite:ignored.db"),
            ("DATABASE_PATH", "/var/lib/assorti.db"),
        ])
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/assorti.db"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("PORT", "http")]),
            Err(ConfigError::InvalidValue(key)) if key == "PORT"
        ));
        assert!(load(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(load(&[("BIND_ADDR", "localhost")]).is_err());
    }

    #[test]
    fn test_blank_token_is_unset() {
        let config = load(&[("TELEGRAM_BOT_TOKEN", "  ")]).unwrap();
        assert!(config.telegram_bot_token.is_none());
    }
}
