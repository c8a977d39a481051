//! Feature stage trait.
//!
//! A feature stage is one step of the feature pipeline: it reads columns
//! from a table and returns the table with derived columns appended.
//! Ratio builders and time-series builders both implement it, which lets
//! the pipeline validate inputs and run stages uniformly.

use crate::{Result, types::has_column};
use polars::prelude::*;

/// One step of the feature pipeline.
///
/// Implementations should be thread-safe (`Send + Sync`) so a configured
/// pipeline can be shared between threads.
///
/// # Example
///
/// ```no_run
/// use mktcap_traits::{FeatureStage, Result};
/// use polars::prelude::*;
///
/// struct Doubler;
///
/// impl FeatureStage for Doubler {
///     fn name(&self) -> &str {
///         "doubler"
///     }
///
///     fn required_columns(&self) -> Vec<String> {
///         vec!["revenue".to_string()]
///     }
///
///     fn output_columns(&self) -> Vec<String> {
///         vec!["revenueDoubled".to_string()]
///     }
///
///     fn apply(&self, data: &DataFrame) -> Result<DataFrame> {
///         let mut out = data.clone();
///         let doubled = data.column("revenue")?.as_materialized_series() * 2.0;
///         out.with_column(doubled.with_name("revenueDoubled".into()))?;
///         Ok(out)
///     }
/// }
/// ```
pub trait FeatureStage: Send + Sync {
    /// Returns the name of this stage, used in logs and reports.
    fn name(&self) -> &str;

    /// Columns this stage reads.
    fn required_columns(&self) -> Vec<String>;

    /// Columns this stage appends, in output order.
    fn output_columns(&self) -> Vec<String>;

    /// Returns `data` with this stage's output columns appended.
    ///
    /// # Errors
    ///
    /// Returns an error if required columns are missing or a Polars
    /// operation fails.
    fn apply(&self, data: &DataFrame) -> Result<DataFrame>;

    /// Required columns that are absent from `data`.
    fn missing_columns(&self, data: &DataFrame) -> Vec<String> {
        self.required_columns()
            .into_iter()
            .filter(|name| !has_column(data, name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestStage;

    impl FeatureStage for TestStage {
        fn name(&self) -> &str {
            "test_stage"
        }

        fn required_columns(&self) -> Vec<String> {
            vec!["revenue".to_string(), "totalAssets".to_string()]
        }

        fn output_columns(&self) -> Vec<String> {
            vec!["revenueToAssets".to_string()]
        }

        fn apply(&self, data: &DataFrame) -> Result<DataFrame> {
            Ok(data.clone())
        }
    }

    #[test]
    fn test_missing_columns() {
        let df = df! {
            "revenue" => &[1.0],
        }
        .unwrap();

        let stage = TestStage;
        assert_eq!(stage.missing_columns(&df), vec!["totalAssets".to_string()]);
    }

    #[test]
    fn test_stage_metadata() {
        let stage = TestStage;
        assert_eq!(stage.name(), "test_stage");
        assert_eq!(stage.output_columns(), vec!["revenueToAssets".to_string()]);
    }

    #[test]
    fn test_stage_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn FeatureStage>>();
    }
}
