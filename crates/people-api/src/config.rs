//! # Service Configuration
//!
//! Built from environment variables at startup. A `.env` file in the
//! working directory is loaded first when present.

use people_enrich::EnrichConfig;
use sqlx::postgres::PgConnectOptions;
use zeroize::Zeroizing;

/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Log output format, selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// `LOG_FORMAT=json` selects JSON; anything else is human-readable text.
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// PostgreSQL connection settings.
///
/// Custom `Debug` redacts the password.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Zeroizing<String>,
    pub database: String,
    pub max_connections: u32,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl DatabaseConfig {
    /// Load database settings. Returns `Ok(None)` when `DB_HOST` is unset,
    /// which selects the in-memory store.
    ///
    /// Variables:
    /// - `DB_HOST` (required to enable Postgres)
    /// - `DB_PORT` (default: 5432)
    /// - `DB_USER` (default: `postgres`)
    /// - `DB_PASSWORD` (default: empty)
    /// - `DB_NAME` (default: `postgres`)
    /// - `DB_MAX_CONNECTIONS` (default: 10)
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let host = match std::env::var("DB_HOST") {
            Ok(h) if !h.trim().is_empty() => h,
            _ => return Ok(None),
        };

        Ok(Some(Self {
            host,
            port: env_parse("DB_PORT", 5432)?,
            user: std::env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: Zeroizing::new(std::env::var("DB_PASSWORD").unwrap_or_default()),
            database: std::env::var("DB_NAME").unwrap_or_else(|_| "postgres".to_string()),
            max_connections: env_parse("DB_MAX_CONNECTIONS", 10)?,
        }))
    }

    /// SQLx connection options for these settings.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(self.password.as_str())
            .database(&self.database)
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to (`SERVER_PORT`).
    pub port: u16,
    /// Postgres settings; `None` selects the in-memory store.
    pub database: Option<DatabaseConfig>,
    /// Lookup service endpoints.
    pub enrich: EnrichConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: env_parse("SERVER_PORT", DEFAULT_PORT)?,
            database: DatabaseConfig::from_env()?,
            enrich: EnrichConfig::from_env()?,
        })
    }
}

/// Parse `var` as `T`, falling back to `default` when unset. A set but
/// unparseable value is an error.
fn env_parse<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(var.to_string(), raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors. All are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(String, String),
    #[error(transparent)]
    Enrich(#[from] people_enrich::config::ConfigError),
}
