//! Enrichment client error types.

/// Errors from a single demographic lookup.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    /// HTTP transport error, including timeouts.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Lookup service returned a non-2xx status.
    #[error("lookup {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
}
