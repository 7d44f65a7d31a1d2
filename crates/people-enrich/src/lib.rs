//! # people-enrich -- Typed client for name-based demographic lookups
//!
//! Wraps three independent outbound lookups keyed by first name:
//! - **Age** via an agify-compatible endpoint (`{"age": 35}`)
//! - **Gender** via a genderize-compatible endpoint (`{"gender": "male"}`)
//! - **Nationality** via a nationalize-compatible endpoint
//!   (`{"country": [{"country_id": "RU", "probability": 0.8}]}`)
//!
//! ## Failure model
//!
//! Every lookup is best-effort. The individual `get_*` calls return a
//! typed [`EnrichError`]; [`EnrichmentClient::demographics`] runs all three
//! in sequence and turns each failure into an absent attribute, so one
//! unreachable service never invalidates the other two. There are no
//! retries and no caching.

pub mod config;
pub mod error;
pub mod types;

pub use config::EnrichConfig;
pub use error::EnrichError;
pub use types::Demographics;

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::types::{AgeResponse, GenderResponse, NationalityResponse};

/// Client for the three lookup services. Cheap to clone; all clones share
/// one connection pool.
#[derive(Debug, Clone)]
pub struct EnrichmentClient {
    http: reqwest::Client,
    age_url: Url,
    gender_url: Url,
    nationality_url: Url,
}

impl EnrichmentClient {
    /// Create a new client from configuration.
    pub fn new(config: EnrichConfig) -> Result<Self, EnrichError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EnrichError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            age_url: config.age_url,
            gender_url: config.gender_url,
            nationality_url: config.nationality_url,
        })
    }

    /// Estimated age for `name`. A `null` age decodes to `0`.
    pub async fn get_age(&self, name: &str) -> Result<i32, EnrichError> {
        let resp: AgeResponse = self.lookup("GET age", &self.age_url, name).await?;
        Ok(resp.age.unwrap_or_default())
    }

    /// Gender label for `name`. A `null` gender decodes to an empty string.
    pub async fn get_gender(&self, name: &str) -> Result<String, EnrichError> {
        let resp: GenderResponse = self.lookup("GET gender", &self.gender_url, name).await?;
        Ok(resp.gender.unwrap_or_default())
    }

    /// Country code of the highest-ranked nationality guess for `name`,
    /// or an empty string when the service has no guesses.
    pub async fn get_nationality(&self, name: &str) -> Result<String, EnrichError> {
        let resp: NationalityResponse = self
            .lookup("GET nationality", &self.nationality_url, name)
            .await?;
        Ok(resp.top_country().unwrap_or_default().to_string())
    }

    /// Run all three lookups sequentially and keep whatever succeeded.
    pub async fn demographics(&self, name: &str) -> Demographics {
        let age = self
            .get_age(name)
            .await
            .map_err(|e| tracing::warn!(error = %e, "age lookup failed"))
            .ok();
        let gender = self
            .get_gender(name)
            .await
            .map_err(|e| tracing::warn!(error = %e, "gender lookup failed"))
            .ok();
        let nationality = self
            .get_nationality(name)
            .await
            .map_err(|e| tracing::warn!(error = %e, "nationality lookup failed"))
            .ok();

        Demographics {
            age,
            gender,
            nationality,
        }
    }

    async fn lookup<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        base: &Url,
        name: &str,
    ) -> Result<T, EnrichError> {
        let mut url = base.clone();
        url.query_pairs_mut().append_pair("name", name);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| EnrichError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(EnrichError::ApiError {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| EnrichError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })
    }
}
