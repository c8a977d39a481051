//! Feature generation for market-capitalization models.
//!
//! This crate turns raw financial-statement rows (with macro indicators
//! already joined on) into a clean numeric feature matrix:
//! - Ratios: balance-sheet items over total assets, income and cash-flow
//!   items over revenue, and a handful of composites
//! - Time series: year-over-year change and 3-period trailing means per entity
//! - Cleanup: infinities and nulls replaced so every feature is finite
//!
//! Preprocessing helpers from the same workflow live alongside:
//! percentile clipping ([`Winsorizer`]), column profiling ([`describe`])
//! and duplicate-key checks ([`duplicate_keys`]).
//!
//! # Example
//!
//! ```ignore
//! use mktcap_features::{FeatureConfig, FeaturePipeline};
//!
//! let pipeline = FeaturePipeline::new(FeatureConfig::default());
//! let output = pipeline.run(&statements)?;
//! println!("{} rows, {} features", output.table.len(), output.table.feature_names().len());
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod config;
pub mod overrides;
pub mod pipeline;
pub mod profile;
pub mod ratio;
pub mod term;
pub mod timeseries;
pub mod winsorize;

// Re-export key types
pub use catalog::{DENOMINATOR_EPSILON, FeatureFamily, FeatureInfo, RatioDefinition};
pub use config::{FeatureConfig, KeyColumns, TimeSeriesConfig};
pub use overrides::{ValueOverride, ValueOverrides};
pub use pipeline::{FeaturePipeline, PipelineOutput, PipelineReport};
pub use profile::{describe, duplicate_keys};
pub use ratio::{RatioFeatureBuilder, RatioReport};
pub use term::Term;
pub use timeseries::{EntityGroups, TimeSeriesFeatureBuilder};
pub use winsorize::{Winsorizer, WinsorizerConfig};
