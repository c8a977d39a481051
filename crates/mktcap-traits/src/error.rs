//! Error types for the mktcap workspace.
//!
//! Arithmetic degeneracies (division by zero, infinities) are not errors:
//! they flow through the computation and are cleaned at the pipeline
//! boundary. The variants below cover the conditions that must stop a run.

use thiserror::Error;

/// The main error type for mktcap operations.
#[derive(Debug, Error)]
pub enum MktcapError {
    /// A required column is missing from the input table.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Rows are not ordered by entity then period.
    #[error("Unsorted input at row {row}: {detail}")]
    UnsortedInput {
        /// Index of the first out-of-order row.
        row: usize,
        /// What was out of order.
        detail: String,
    },

    /// A periodic scale whose bounds do not describe a range.
    #[error("Degenerate range: low ({low}) must be finite and below high ({high})")]
    DegenerateRange {
        /// Lower bound of the scale.
        low: f64,
        /// Upper bound of the scale.
        high: f64,
    },

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl From<String> for MktcapError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for MktcapError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for mktcap operations.
pub type Result<T> = std::result::Result<T, MktcapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MktcapError::MissingColumn("totalAssets".to_string());
        assert_eq!(err.to_string(), "Missing required column: totalAssets");

        let err = MktcapError::DegenerateRange {
            low: 5.0,
            high: 5.0,
        };
        assert_eq!(
            err.to_string(),
            "Degenerate range: low (5) must be finite and below high (5)"
        );
    }

    #[test]
    fn test_unsorted_display() {
        let err = MktcapError::UnsortedInput {
            row: 3,
            detail: "calendarYear 2019 follows 2021 for AAPL".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsorted input at row 3: calendarYear 2019 follows 2021 for AAPL"
        );
    }

    #[test]
    fn test_error_from_str() {
        let err: MktcapError = "boom".into();
        assert!(matches!(err, MktcapError::Other(_)));
    }
}
