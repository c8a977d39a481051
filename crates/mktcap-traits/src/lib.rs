#![doc(issue_tracker_base_url = "https://github.com/factordynamics/mktcap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core definitions for the mktcap workspace.
//!
//! This crate provides the table containers, the error type and the
//! [`FeatureStage`] abstraction shared by the period-inference and
//! feature-generation crates.

/// The version of the mktcap-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod stage;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{MktcapError, Result};
pub use stage::FeatureStage;
pub use types::{Date, FeatureRow, FeatureTable, StatementFrame, Symbol};
