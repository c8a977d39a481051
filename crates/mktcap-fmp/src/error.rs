//! Error types for the FMP API client.

use thiserror::Error;

/// Errors that can occur when using the FMP API.
#[derive(Debug, Error)]
pub enum FmpError {
    /// Missing API key.
    #[error("FMP_API_KEY environment variable not set")]
    MissingApiKey,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error.
    #[error("FMP API error: {0}")]
    Api(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// No data available.
    #[error("No data available for {0}")]
    NoData(String),

    /// Building the statement frame failed.
    #[error("Frame error: {0}")]
    Frame(#[from] mktcap_traits::MktcapError),
}

impl From<polars::prelude::PolarsError> for FmpError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::Frame(err.into())
    }
}
