//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Origin used when building share links.
    pub public_base_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CONSOLE_ADDR` | Server bind address | `127.0.0.1:8787` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:console.db?mode=rwc` |
    /// | `PUBLIC_BASE_URL` | Origin for share links | `http://{CONSOLE_ADDR}` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr: SocketAddr = env::var("CONSOLE_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8787".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:console.db?mode=rwc".to_string());

        let public_base_url = match env::var("PUBLIC_BASE_URL") {
            Ok(url) if url.starts_with("http://") || url.starts_with("https://") => {
                url.trim_end_matches('/').to_string()
            }
            Ok(_) => return Err(ConfigError::InvalidBaseUrl),
            Err(_) => format!("http://{}", addr),
        };

        Ok(Self {
            addr,
            database_url,
            public_base_url,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid CONSOLE_ADDR format")]
    InvalidAddr,

    #[error("PUBLIC_BASE_URL must start with http:// or https://")]
    InvalidBaseUrl,
}
