//! Gateway configuration loaded from environment variables.

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

const DATABASE_URL: &str = "CONCIERGE_DATABASE_URL";
const BIND_ADDR: &str = "CONCIERGE_BIND_ADDR";
const PUBLIC_BASE_URL: &str = "CONCIERGE_PUBLIC_BASE_URL";
const INVOKE_TIMEOUT_SECS: &str = "CONCIERGE_INVOKE_TIMEOUT_SECS";
const DB_POOL_SIZE: &str = "CONCIERGE_DB_POOL_SIZE";
const LOG_FORMAT: &str = "CONCIERGE_LOG_FORMAT";
const API_KEY: &str = "CONCIERGE_API_KEY";
const OAUTH_TOKEN: &str = "CONCIERGE_OAUTH_TOKEN";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_INVOKE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DB_POOL_SIZE: u32 = 10;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Runtime configuration for the gateway process.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// `PostgreSQL` connection URL.
    pub database_url: String,
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
    /// Absolute base URL used for card URLs and relative serving URLs.
    pub public_base_url: Option<String>,
    /// Default remote call timeout.
    pub invoke_timeout: Duration,
    /// Maximum database connections.
    pub db_pool_size: u32,
    /// Log output format.
    pub log_format: LogFormat,
    /// Credential for `apikey` security schemes.
    pub api_key: Option<String>,
    /// Credential for `oauth2` security schemes.
    pub oauth_token: Option<String>,
}

impl GatewayConfig {
    /// Loads configuration from the process environment.
    ///
    /// Required:
    /// - `CONCIERGE_DATABASE_URL`
    ///
    /// Optional (with defaults):
    /// - `CONCIERGE_BIND_ADDR` (`0.0.0.0:8080`)
    /// - `CONCIERGE_PUBLIC_BASE_URL` (unset)
    /// - `CONCIERGE_INVOKE_TIMEOUT_SECS` (`30`)
    /// - `CONCIERGE_DB_POOL_SIZE` (`10`)
    /// - `CONCIERGE_LOG_FORMAT` (`text` or `json`)
    /// - `CONCIERGE_API_KEY`, `CONCIERGE_OAUTH_TOKEN` (unset)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let database_url = read(DATABASE_URL).ok_or(ConfigError::Missing(DATABASE_URL))?;

        let bind_addr = read(BIND_ADDR)
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|_| {
                ConfigError::Invalid(BIND_ADDR, "must be a socket address such as 0.0.0.0:8080")
            })?;

        let public_base_url = read(PUBLIC_BASE_URL)
            .map(|value| {
                let lower = value.to_ascii_lowercase();
                if lower.starts_with("http://") || lower.starts_with("https://") {
                    Ok(value.trim_end_matches('/').to_owned())
                } else {
                    Err(ConfigError::Invalid(
                        PUBLIC_BASE_URL,
                        "must be an absolute http(s) URL",
                    ))
                }
            })
            .transpose()?;

        let timeout_secs = positive(read(INVOKE_TIMEOUT_SECS), DEFAULT_INVOKE_TIMEOUT_SECS)
            .ok_or(ConfigError::Invalid(INVOKE_TIMEOUT_SECS, "must be a positive integer"))?;

        let db_pool_size = positive(read(DB_POOL_SIZE), DEFAULT_DB_POOL_SIZE)
            .ok_or(ConfigError::Invalid(DB_POOL_SIZE, "must be a positive integer"))?;

        let log_format = match read(LOG_FORMAT).map(|value| value.to_ascii_lowercase()).as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(_) => return Err(ConfigError::Invalid(LOG_FORMAT, "must be 'text' or 'json'")),
        };

        Ok(Self {
            database_url,
            bind_addr,
            public_base_url,
            invoke_timeout: Duration::from_secs(timeout_secs),
            db_pool_size,
            log_format,
            api_key: read(API_KEY),
            oauth_token: read(OAUTH_TOKEN),
        })
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted = |secret: Option<&String>| secret.map(|_| "<redacted>");
        f.debug_struct("GatewayConfig")
            .field("database_url", &"<redacted>")
            .field("bind_addr", &self.bind_addr)
            .field("public_base_url", &self.public_base_url)
            .field("invoke_timeout", &self.invoke_timeout)
            .field("db_pool_size", &self.db_pool_size)
            .field("log_format", &self.log_format)
            .field("api_key", &redacted(self.api_key.as_ref()))
            .field("oauth_token", &redacted(self.oauth_token.as_ref()))
            .finish()
    }
}

fn positive<T>(raw: Option<String>, default: T) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    raw.map_or(Some(default), |value| {
        value.parse::<T>().ok().filter(|parsed| *parsed > T::default())
    })
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
