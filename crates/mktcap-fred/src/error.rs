//! Error types for the FRED client.

use thiserror::Error;

/// Errors that can occur when using the FRED API.
#[derive(Debug, Error)]
pub enum FredError {
    /// Missing API key.
    #[error("FRED_API_KEY environment variable not set")]
    MissingApiKey,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error.
    #[error("FRED API error: {0}")]
    Api(String),

    /// An observation carried an unparseable date.
    #[error("Invalid observation date: {0}")]
    InvalidDate(String),

    /// Building or joining a frame failed.
    #[error("Frame error: {0}")]
    Frame(#[from] mktcap_traits::MktcapError),
}

impl From<polars::prelude::PolarsError> for FredError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::Frame(err.into())
    }
}
