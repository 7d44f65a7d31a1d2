//! Configuration for the demographic lookup services.

use url::Url;

/// Default per-request timeout shared by all three lookups.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Endpoints and timeout for the enrichment client.
///
/// Each URL is the full lookup endpoint; the client appends `?name=<name>`.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Age-by-name endpoint (agify-compatible).
    pub age_url: Url,
    /// Gender-by-name endpoint (genderize-compatible).
    pub gender_url: Url,
    /// Nationality-by-name endpoint (nationalize-compatible).
    pub nationality_url: Url,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl EnrichConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `AGE_API_URL` (default: `https://api.agify.io`)
    /// - `GENDER_API_URL` (default: `https://api.genderize.io`)
    /// - `NATIONALITY_API_URL` (default: `https://api.nationalize.io`)
    /// - `ENRICH_TIMEOUT_SECS` (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            age_url: env_url("AGE_API_URL", "https://api.agify.io")?,
            gender_url: env_url("GENDER_API_URL", "https://api.genderize.io")?,
            nationality_url: env_url("NATIONALITY_API_URL", "https://api.nationalize.io")?,
            timeout_secs: std::env::var("ENRICH_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Point all three lookups at a single base URL, one path per service.
    ///
    /// Used by tests that serve every lookup from one mock server.
    pub fn with_base_url(base: &str) -> Result<Self, ConfigError> {
        let make_url = |path: &str| -> Result<Url, ConfigError> {
            let raw = format!("{}/{path}", base.trim_end_matches('/'));
            Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(raw.clone(), e.to_string()))
        };
        Ok(Self {
            age_url: make_url("age")?,
            gender_url: make_url("gender")?,
            nationality_url: make_url("nationality")?,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
