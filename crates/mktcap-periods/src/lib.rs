//! Reporting-period inference from filing dates.
//!
//! Filing dates cluster around the same days of the year for a given
//! company and fiscal period. This crate summarizes those clusters with
//! circular statistics (day 365 is adjacent to day 1) and classifies new
//! observations by their nearest cluster:
//!
//! - [`circular`]: circular distance and circular mean on a periodic scale
//! - [`calendar`]: day-of-year and related date parts for date columns
//! - [`reference`]: per-entity, per-period representative day-of-year table
//! - [`infer`]: nearest-period classification against that table
//! - [`shared`]: atomic publication of rebuilt tables to concurrent readers
//!
//! # Example
//!
//! ```ignore
//! use mktcap_periods::{PeriodInferer, PeriodReferenceBuilder, DAYS_IN_YEAR};
//!
//! let builder = PeriodReferenceBuilder::new(0.0, DAYS_IN_YEAR)?;
//! let table = builder.build(&filings, "fillingDate_yday", &["symbol", "period"])?;
//!
//! let inferer = PeriodInferer::new(&table, builder.scale());
//! let label = inferer.infer("AAPL", 303.0);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod calendar;
pub mod circular;
pub mod infer;
pub mod reference;
pub mod shared;

// Re-export key types
pub use calendar::{DateParts, add_date_parts};
pub use circular::{CircularScale, DAYS_IN_YEAR, circular_distance};
pub use infer::PeriodInferer;
pub use reference::{PeriodReferenceBuilder, PeriodReferenceTable};
pub use shared::ReferenceTableHandle;
