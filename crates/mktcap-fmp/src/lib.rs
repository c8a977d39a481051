//! Financial Modeling Prep (FMP) API client for mktcap.
//!
//! Fetches income statements, balance sheets, cash flow statements and
//! historical market capitalization from the
//! [Financial Modeling Prep](https://financialmodelingprep.com/) API and
//! merges them into statement frames ready for the feature pipeline.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mktcap_fmp::{FmpClient, Period, statements_frame};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FmpClient::from_env()?;
//!
//!     let data = client
//!         .bulk_fundamental_data(&["AAPL", "MSFT"], Period::Annual, Some(10))
//!         .await;
//!     let frame = statements_frame(&data)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! Set `FMP_API_KEY` in your environment or `.env` file:
//!
//! ```bash
//! FMP_API_KEY=your_api_key_here
//! ```

mod client;
mod error;
mod frame;
mod types;

pub use client::FmpClient;
pub use error::FmpError;
pub use frame::{HEADER_COLUMNS, statements_frame};
pub use types::*;

/// Result type for FMP operations.
pub type Result<T> = std::result::Result<T, FmpError>;
