#![doc(issue_tracker_base_url = "https://github.com/factordynamics/mktcap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # mktcap
//!
//! Market-capitalization features from financial statements.
//!
//! mktcap is an umbrella crate that re-exports the mktcap sub-crates. It
//! covers the path from raw statements to a model-ready feature table, plus
//! the reporting-period inference used when filings lack reliable labels.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mktcap::{FeatureConfig, FeaturePipeline, StatementFrame};
//!
//! # fn main() -> mktcap::Result<()> {
//! let statements = StatementFrame::new(frame);
//! let output = FeaturePipeline::new(FeatureConfig::default()).run(&statements)?;
//! println!("{} rows, {} features", output.report.rows, output.report.features);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Error type, table containers and the [`FeatureStage`] trait
//! - [`periods`] - Circular distance, period reference tables and inference
//! - [`features`] - Ratio, growth and trend features and the pipeline
//! - [`fmp`] - Financial Modeling Prep client
//! - [`fred`] - FRED client and as-of macro joins
//!
//! ## Architecture
//!
//! 1. **Data**: statements from FMP, macro series from FRED joined by filing date
//! 2. **Periods**: a per-entity table of representative filing days infers
//!    which reporting period a filing belongs to
//! 3. **Features**: ratios, year-over-year changes and trailing trends
//! 4. **Output**: a finite, non-null feature matrix with the market cap target

/// Version information for the mktcap crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core definitions.
///
/// - [`MktcapError`] and [`Result`]
/// - [`StatementFrame`] and [`FeatureTable`] containers
/// - [`FeatureStage`] - one step of the feature pipeline
/// - [`stats`](mktcap_traits::stats) - descriptive statistics
pub mod traits {
    pub use mktcap_traits::*;
}

// Re-export core types at top level for convenience
pub use mktcap_traits::{
    Date, FeatureRow, FeatureStage, FeatureTable, MktcapError, Result, StatementFrame, Symbol,
};

/// Reporting-period inference.
///
/// Day-of-year values wrap around, so filings on December 30 and January 2
/// are three days apart. [`CircularScale`] measures that distance and takes
/// circular means; [`PeriodReferenceBuilder`] turns labelled history into a
/// [`PeriodReferenceTable`]; [`PeriodInferer`] labels new observations.
///
/// # Example
///
/// ```ignore
/// use mktcap::periods::{PeriodInferer, PeriodReferenceBuilder, add_date_parts};
///
/// let filings = add_date_parts(&filings, "fillingDate")?;
/// let table = PeriodReferenceBuilder::new(0.0, 365.0)?
///     .build(&filings, "fillingDate_yday", &["symbol", "period"])?;
/// let label = PeriodInferer::for_table(&table).infer("AAPL", 305.0);
/// ```
pub mod periods {
    pub use mktcap_periods::*;
}

pub use mktcap_periods::{
    CircularScale, PeriodInferer, PeriodReferenceBuilder, PeriodReferenceTable,
    ReferenceTableHandle, circular_distance,
};

/// Feature generation.
///
/// ## Ratio Families
///
/// - **Balance sheet**: line items over total assets
/// - **Income statement**: line items over revenue
/// - **Cash flow**: line items, buybacks and dividends over revenue
/// - **Composite**: leverage, return on equity and payout ratios
///
/// Each base feature also gets `<name>YoY` and `<name>Trend` columns.
pub mod features {
    pub use mktcap_features::*;
}

pub use mktcap_features::{
    FeatureConfig, FeaturePipeline, PipelineOutput, PipelineReport, RatioFeatureBuilder,
    TimeSeriesFeatureBuilder,
};

/// Financial Modeling Prep client.
pub mod fmp {
    pub use mktcap_fmp::*;
}

/// FRED client and macro joins.
pub mod fred {
    pub use mktcap_fred::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_reexports() {
        let scale = CircularScale::days_of_year();
        assert_eq!(scale.distance(1.0, 365.0), 1.0);
        assert!(!features::catalog::default_ratios().is_empty());
    }
}
