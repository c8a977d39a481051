//! Pipeline configuration.

use crate::catalog::{
    self, ABSOLUTE_COLUMNS, DENOMINATOR_EPSILON, EPSILON_COLUMNS, RatioDefinition,
};
use mktcap_traits::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Names of the key columns in statement and feature tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyColumns {
    /// Entity identifier (default: "symbol")
    pub symbol: String,
    /// Period sort key (default: "calendarYear")
    pub period: String,
    /// Regression target (default: "target")
    pub target: String,
    /// Filing date (default: "fillingDate")
    pub filing_date: String,
}

impl Default for KeyColumns {
    fn default() -> Self {
        Self {
            symbol: "symbol".to_string(),
            period: "calendarYear".to_string(),
            target: "target".to_string(),
            filing_date: "fillingDate".to_string(),
        }
    }
}

/// Configuration for year-over-year and trend features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSeriesConfig {
    /// Trailing window for the trend mean (default: 3)
    pub window: usize,

    /// Minimum non-null values in the window (default: 1)
    pub min_periods: usize,

    /// Emit `<col>YoY` columns (default: true)
    pub yoy: bool,

    /// Emit `<col>Trend` columns (default: true)
    pub trend: bool,

    /// Suffix of growth columns (default: "YoY")
    pub yoy_suffix: String,

    /// Suffix of trend columns (default: "Trend")
    pub trend_suffix: String,

    /// Base columns; `None` means every ratio, absolute and macro column.
    pub columns: Option<Vec<String>>,
}

impl Default for TimeSeriesConfig {
    fn default() -> Self {
        Self {
            window: 3,
            min_periods: 1,
            yoy: true,
            trend: true,
            yoy_suffix: "YoY".to_string(),
            trend_suffix: "Trend".to_string(),
            columns: None,
        }
    }
}

impl TimeSeriesConfig {
    /// Name of the growth column for `base`.
    pub fn yoy_column(&self, base: &str) -> String {
        format!("{base}{}", self.yoy_suffix)
    }

    /// Name of the trend column for `base`.
    pub fn trend_column(&self, base: &str) -> String {
        format!("{base}{}", self.trend_suffix)
    }
}

/// Configuration for [`FeaturePipeline`](crate::FeaturePipeline).
///
/// Every field has a default, so a JSON config only needs the fields it
/// changes.
///
/// # Example
///
/// ```ignore
/// use mktcap_features::FeatureConfig;
///
/// let config = FeatureConfig {
///     macro_columns: vec![],
///     strict_columns: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Key column names.
    pub keys: KeyColumns,

    /// Constant added to the epsilon columns (default: 0.001001)
    pub epsilon: f64,

    /// Columns shifted by `epsilon` before ratios are computed.
    pub epsilon_columns: Vec<String>,

    /// Ratio features.
    pub ratios: Vec<RatioDefinition>,

    /// Scale columns emitted as features after the epsilon shift.
    pub absolute_columns: Vec<String>,

    /// Macro indicator columns passed through unchanged.
    pub macro_columns: Vec<String>,

    /// Extra numeric columns copied to the output without time-series
    /// features. Nulls and non-finite values are zero-filled like features.
    pub passthrough_columns: Vec<String>,

    /// Growth and trend settings.
    pub time_series: TimeSeriesConfig,

    /// Fail on missing input columns instead of treating them as null
    /// (default: false)
    pub strict_columns: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            keys: KeyColumns::default(),
            epsilon: DENOMINATOR_EPSILON,
            epsilon_columns: EPSILON_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
            ratios: catalog::default_ratios(),
            absolute_columns: ABSOLUTE_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
            macro_columns: catalog::macro_columns(),
            passthrough_columns: Vec::new(),
            time_series: TimeSeriesConfig::default(),
            strict_columns: false,
        }
    }
}

impl FeatureConfig {
    /// Parses a config from JSON; absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or malformed JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Base columns for growth and trend features.
    pub fn time_series_columns(&self) -> Vec<String> {
        if let Some(columns) = &self.time_series.columns {
            return columns.clone();
        }
        self.ratios
            .iter()
            .map(|r| r.name.clone())
            .chain(self.absolute_columns.iter().cloned())
            .chain(self.macro_columns.iter().cloned())
            .collect()
    }

    /// Statement columns the ratios and passthroughs read, without repeats.
    pub fn input_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        let ratio_fields = self.ratios.iter().flat_map(RatioDefinition::fields);
        let direct = self
            .absolute_columns
            .iter()
            .chain(&self.macro_columns)
            .chain(&self.passthrough_columns)
            .cloned();
        for column in ratio_fields.chain(direct) {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        columns
    }
}
