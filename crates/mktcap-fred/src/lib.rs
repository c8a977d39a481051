//! FRED client and macro joins for mktcap.
//!
//! Fetches macroeconomic series from the
//! [FRED](https://fred.stlouisfed.org/) `series/observations` API and joins
//! them onto statement rows: each row gets the latest observation on or
//! before its filing date.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mktcap_fred::{FredClient, attach_macro};
//!
//! let client = FredClient::from_env()?;
//! let series = client
//!     .fetch_all(&[("unemployment", "UNRATE"), ("vix", "VIXCLS")], None)
//!     .await;
//! let with_macro = attach_macro(&statements, "fillingDate", &series)?;
//! ```
//!
//! # Environment Variables
//!
//! Set `FRED_API_KEY` in your environment or `.env` file.

mod client;
mod error;
mod series;

pub use client::{FredClient, parse_observations};
pub use error::FredError;
pub use series::{MacroObservations, attach_macro, macro_frame};

/// Result type for FRED operations.
pub type Result<T> = std::result::Result<T, FredError>;
