//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present).

use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub ingest: IngestConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub bridge: BridgeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
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

/// Operating mode, fixed for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    /// Subscribe to new messages as they are posted
    Listen,
    /// Page through the history of every source from its cursor
    Scrape,
}

impl std::fmt::Display for IngestMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Listen => write!(f, "listen"),
            Self::Scrape => write!(f, "scrape"),
        }
    }
}

impl std::str::FromStr for IngestMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "listen" => Ok(Self::Listen),
            "scrape" => Ok(Self::Scrape),
            other => Err(ConfigError::InvalidValue("INGEST_MODE", other.to_string())),
        }
    }
}

/// Ingestion settings
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    pub mode: IngestMode,
    /// Sources to watch (channel usernames or numeric chat ids)
    pub sources: Vec<String>,
    /// Pause between two backfilled messages of the same source
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// Maximum transport lookups in flight at once
    #[serde(default = "default_resolve_concurrency")]
    pub resolve_concurrency: usize,
}

impl IngestConfig {
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Transport bridge configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    pub url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_bridge_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
}

// Default value functions
fn default_app_name() -> String {
    "packscout".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_cooldown_ms() -> u64 {
    2000
}

fn default_resolve_concurrency() -> usize {
    8
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_bridge_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    100
}

fn default_poll_timeout() -> u64 {
    25
}

fn default_reconnect_delay() -> u64 {
    1000
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::MissingVar(key));

        let sources: Vec<String> = required("INGEST_SOURCES")?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if sources.is_empty() {
            return Err(ConfigError::InvalidValue(
                "INGEST_SOURCES",
                "at least one source is required".to_string(),
            ));
        }

        let resolve_concurrency =
            parse_or(&lookup, "RESOLVE_CONCURRENCY", default_resolve_concurrency())?;
        if resolve_concurrency == 0 {
            return Err(ConfigError::InvalidValue(
                "RESOLVE_CONCURRENCY",
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            ingest: IngestConfig {
                mode: required("INGEST_MODE")?.parse()?,
                sources,
                cooldown_ms: parse_or(&lookup, "SCRAPE_COOLDOWN_MS", default_cooldown_ms())?,
                resolve_concurrency,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parse_or(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    default_max_connections(),
                )?,
                min_connections: parse_or(
                    &lookup,
                    "DATABASE_MIN_CONNECTIONS",
                    default_min_connections(),
                )?,
            },
            redis: RedisConfig {
                url: required("REDIS_URL")?,
                max_connections: parse_or(
                    &lookup,
                    "REDIS_MAX_CONNECTIONS",
                    default_redis_max_connections(),
                )?,
            },
            bridge: BridgeConfig {
                url: required("BRIDGE_URL")?,
                token: lookup("BRIDGE_TOKEN").filter(|t| !t.is_empty()),
                timeout_secs: parse_or(&lookup, "BRIDGE_TIMEOUT_SECS", default_bridge_timeout())?,
                page_size: parse_or(&lookup, "BRIDGE_PAGE_SIZE", default_page_size())?,
                poll_timeout_secs: parse_or(
                    &lookup,
                    "BRIDGE_POLL_TIMEOUT_SECS",
                    default_poll_timeout(),
                )?,
                reconnect_delay_ms: parse_or(
                    &lookup,
                    "BRIDGE_RECONNECT_DELAY_MS",
                    default_reconnect_delay(),
                )?,
            },
        })
    }
}

/// Parse an optional variable, falling back to a default when unset
fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
