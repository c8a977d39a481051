//! Year-over-year change and trailing trend per entity.

use crate::config::{FeatureConfig, TimeSeriesConfig};
use mktcap_traits::{
    FeatureStage, MktcapError, Result,
    types::{f64_column, i64_column, str_column},
};
use polars::prelude::*;
use std::ops::Range;
use tracing::{debug, warn};

/// Contiguous row ranges, one per entity, of a frame sorted by
/// `(symbol, period)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityGroups {
    ranges: Vec<Range<usize>>,
    duplicates: usize,
}

impl EntityGroups {
    /// Splits `df` into per-entity row ranges, validating the sort order.
    ///
    /// Symbols must appear in ascending order and periods must not decrease
    /// within a symbol. Equal consecutive periods are duplicate keys: they
    /// are tolerated and counted.
    ///
    /// # Errors
    ///
    /// Returns [`MktcapError::UnsortedInput`] naming the first row out of
    /// order, [`MktcapError::InvalidData`] for a null key and
    /// [`MktcapError::MissingColumn`] for an absent key column.
    pub fn from_frame(df: &DataFrame, symbol_column: &str, period_column: &str) -> Result<Self> {
        let symbols = str_column(df, symbol_column)?;
        let periods = i64_column(df, period_column)?;

        let mut ranges = Vec::new();
        let mut duplicates = 0usize;
        let mut start = 0usize;
        let mut previous: Option<(&str, i64)> = None;

        for (row, (symbol, period)) in symbols.iter().zip(&periods).enumerate() {
            let (Some(symbol), Some(period)) = (symbol.as_deref(), *period) else {
                return Err(MktcapError::InvalidData(format!(
                    "null {symbol_column} or {period_column} at row {row}"
                )));
            };

            if let Some((prev_symbol, prev_period)) = previous {
                if symbol == prev_symbol {
                    if period < prev_period {
                        return Err(MktcapError::UnsortedInput {
                            row,
                            detail: format!(
                                "{period_column} {period} follows {prev_period} for {symbol}"
                            ),
                        });
                    }
                    if period == prev_period {
                        duplicates += 1;
                    }
                } else if symbol < prev_symbol {
                    return Err(MktcapError::UnsortedInput {
                        row,
                        detail: format!("{symbol_column} {symbol} follows {prev_symbol}"),
                    });
                } else {
                    ranges.push(start..row);
                    start = row;
                }
            }
            previous = Some((symbol, period));
        }
        if previous.is_some() {
            ranges.push(start..symbols.len());
        }

        if duplicates > 0 {
            warn!(duplicates, "duplicate entity/period keys in input");
        }
        Ok(Self { ranges, duplicates })
    }

    /// Row ranges in frame order.
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether there are no entities.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Rows whose `(symbol, period)` equals the previous row's.
    pub const fn duplicates(&self) -> usize {
        self.duplicates
    }
}

/// Appends `<col>YoY` and `<col>Trend` columns computed within each entity.
///
/// - `<col>YoY = (v[t] - v[t-1]) / v[t-1]`, null for an entity's first
///   period and whenever either value is null
/// - `<col>Trend` is the trailing mean over `window` periods, skipping
///   nulls; null when fewer than `min_periods` values are present
///
/// Input must be sorted by `(symbol, period)`; unsorted input is rejected
/// rather than silently mixing entities.
///
/// # Example
///
/// ```ignore
/// use mktcap_features::{TimeSeriesConfig, TimeSeriesFeatureBuilder};
///
/// let builder = TimeSeriesFeatureBuilder::new(
///     vec!["revenue".to_string()],
///     TimeSeriesConfig::default(),
/// );
/// let with_trends = builder.build(&sorted)?;
/// ```
#[derive(Debug, Clone)]
pub struct TimeSeriesFeatureBuilder {
    columns: Vec<String>,
    config: TimeSeriesConfig,
    symbol_column: String,
    period_column: String,
}

impl TimeSeriesFeatureBuilder {
    /// Creates a builder over `columns` keyed by `symbol` and `calendarYear`.
    pub fn new(columns: Vec<String>, config: TimeSeriesConfig) -> Self {
        Self {
            columns,
            config,
            symbol_column: "symbol".to_string(),
            period_column: "calendarYear".to_string(),
        }
    }

    /// Creates a builder from the time-series parts of `config`.
    pub fn from_config(config: &FeatureConfig) -> Self {
        Self::new(config.time_series_columns(), config.time_series.clone())
            .with_keys(&config.keys.symbol, &config.keys.period)
    }

    /// Overrides the key column names.
    #[must_use]
    pub fn with_keys(mut self, symbol_column: &str, period_column: &str) -> Self {
        self.symbol_column = symbol_column.to_string();
        self.period_column = period_column.to_string();
        self
    }

    /// Base columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Time-series settings.
    pub const fn config(&self) -> &TimeSeriesConfig {
        &self.config
    }

    /// Validates the sort order, then appends growth and trend columns.
    ///
    /// # Errors
    ///
    /// Returns [`MktcapError::UnsortedInput`] for unsorted input and
    /// [`MktcapError::MissingColumn`] for an absent base column.
    pub fn build(&self, data: &DataFrame) -> Result<DataFrame> {
        let groups = EntityGroups::from_frame(data, &self.symbol_column, &self.period_column)?;
        self.build_grouped(data, &groups)
    }

    /// Appends growth and trend columns using precomputed entity groups.
    ///
    /// # Errors
    ///
    /// Returns [`MktcapError::InvalidData`] for a zero window and
    /// [`MktcapError::MissingColumn`] for an absent base column.
    pub fn build_grouped(&self, data: &DataFrame, groups: &EntityGroups) -> Result<DataFrame> {
        if self.config.window == 0 {
            return Err(MktcapError::InvalidData(
                "trend window must be at least 1".to_string(),
            ));
        }

        let mut out = data.clone();
        for column in &self.columns {
            let values = f64_column(data, column)?;
            if self.config.yoy {
                let yoy = year_over_year(&values, groups);
                out.with_column(Series::new(self.config.yoy_column(column).into(), yoy))?;
            }
            if self.config.trend {
                let trend = trailing_mean(
                    &values,
                    groups,
                    self.config.window,
                    self.config.min_periods,
                );
                out.with_column(Series::new(self.config.trend_column(column).into(), trend))?;
            }
        }

        debug!(
            columns = self.columns.len(),
            entities = groups.len(),
            "computed time-series features"
        );
        Ok(out)
    }
}

fn year_over_year(values: &[Option<f64>], groups: &EntityGroups) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    for range in groups.ranges() {
        for i in range.start + 1..range.end {
            if let (Some(previous), Some(current)) = (values[i - 1], values[i]) {
                out[i] = Some((current - previous) / previous);
            }
        }
    }
    out
}

fn trailing_mean(
    values: &[Option<f64>],
    groups: &EntityGroups,
    window: usize,
    min_periods: usize,
) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    for range in groups.ranges() {
        for i in range.clone() {
            let first = range.start.max((i + 1).saturating_sub(window));
            let present: Vec<f64> = values[first..=i].iter().flatten().copied().collect();
            if !present.is_empty() && present.len() >= min_periods {
                out[i] = Some(present.iter().sum::<f64>() / present.len() as f64);
            }
        }
    }
    out
}

impl FeatureStage for TimeSeriesFeatureBuilder {
    fn name(&self) -> &str {
        "time_series"
    }

    fn required_columns(&self) -> Vec<String> {
        let mut columns = vec![self.symbol_column.clone(), self.period_column.clone()];
        columns.extend(self.columns.iter().cloned());
        columns
    }

    fn output_columns(&self) -> Vec<String> {
        let mut columns = Vec::new();
        for column in &self.columns {
            if self.config.yoy {
                columns.push(self.config.yoy_column(column));
            }
            if self.config.trend {
                columns.push(self.config.trend_column(column));
            }
        }
        columns
    }

    fn apply(&self, data: &DataFrame) -> Result<DataFrame> {
        self.build(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn revenue_builder() -> TimeSeriesFeatureBuilder {
        TimeSeriesFeatureBuilder::new(vec!["revenue".to_string()], TimeSeriesConfig::default())
    }

    fn values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        f64_column(df, name).unwrap()
    }

    #[test]
    fn test_yoy_and_trend_single_entity() {
        let df = df! {
            "symbol" => &["A", "A", "A", "A"],
            "calendarYear" => &[2020i64, 2021, 2022, 2023],
            "revenue" => &[1.0, 2.0, 3.0, 6.0],
        }
        .unwrap();

        let out = revenue_builder().build(&df).unwrap();

        let yoy = values(&out, "revenueYoY");
        assert!(yoy[0].is_none());
        assert_relative_eq!(yoy[1].unwrap(), 1.0);
        assert_relative_eq!(yoy[2].unwrap(), 0.5);
        assert_relative_eq!(yoy[3].unwrap(), 1.0);

        let trend = values(&out, "revenueTrend");
        assert_relative_eq!(trend[0].unwrap(), 1.0);
        assert_relative_eq!(trend[1].unwrap(), 1.5);
        assert_relative_eq!(trend[2].unwrap(), 2.0);
        assert_relative_eq!(trend[3].unwrap(), 11.0 / 3.0);
    }

    #[test]
    fn test_entities_do_not_mix() {
        let df = df! {
            "symbol" => &["A", "A", "B", "B"],
            "calendarYear" => &[2020i64, 2021, 2020, 2021],
            "revenue" => &[100.0, 110.0, 50.0, 25.0],
        }
        .unwrap();

        let out = revenue_builder().build(&df).unwrap();
        let yoy = values(&out, "revenueYoY");
        assert!(yoy[0].is_none());
        assert_relative_eq!(yoy[1].unwrap(), 0.1);
        assert!(yoy[2].is_none());
        assert_relative_eq!(yoy[3].unwrap(), -0.5);

        let trend = values(&out, "revenueTrend");
        assert_relative_eq!(trend[2].unwrap(), 50.0);
    }

    #[test]
    fn test_nulls_skipped_in_window() {
        let df = df! {
            "symbol" => &["A", "A", "A"],
            "calendarYear" => &[2020i64, 2021, 2022],
            "revenue" => &[Some(4.0), None, Some(8.0)],
        }
        .unwrap();

        let out = revenue_builder().build(&df).unwrap();
        let yoy = values(&out, "revenueYoY");
        assert!(yoy[1].is_none());
        assert!(yoy[2].is_none());

        let trend = values(&out, "revenueTrend");
        assert_relative_eq!(trend[1].unwrap(), 4.0);
        assert_relative_eq!(trend[2].unwrap(), 6.0);
    }

    #[test]
    fn test_min_periods() {
        let df = df! {
            "symbol" => &["A", "A", "A"],
            "calendarYear" => &[2020i64, 2021, 2022],
            "revenue" => &[1.0, 2.0, 3.0],
        }
        .unwrap();
        let config = TimeSeriesConfig {
            min_periods: 2,
            yoy: false,
            ..Default::default()
        };
        let builder = TimeSeriesFeatureBuilder::new(vec!["revenue".to_string()], config);
        let out = builder.build(&df).unwrap();

        assert!(!out.get_column_names().iter().any(|c| c.as_str() == "revenueYoY"));
        let trend = values(&out, "revenueTrend");
        assert!(trend[0].is_none());
        assert_relative_eq!(trend[1].unwrap(), 1.5);
    }

    #[test]
    fn test_unsorted_years_rejected() {
        let df = df! {
            "symbol" => &["A", "A", "A"],
            "calendarYear" => &[2021i64, 2020, 2022],
            "revenue" => &[1.0, 2.0, 3.0],
        }
        .unwrap();

        let err = revenue_builder().build(&df).unwrap_err();
        assert!(matches!(err, MktcapError::UnsortedInput { row: 1, .. }));
    }

    #[test]
    fn test_unsorted_symbols_rejected() {
        let df = df! {
            "symbol" => &["B", "A"],
            "calendarYear" => &[2020i64, 2020],
            "revenue" => &[1.0, 2.0],
        }
        .unwrap();

        let err = revenue_builder().build(&df).unwrap_err();
        assert!(matches!(err, MktcapError::UnsortedInput { row: 1, .. }));
    }

    #[test]
    fn test_duplicate_keys_tolerated() {
        let df = df! {
            "symbol" => &["A", "A", "A"],
            "calendarYear" => &[2020i64, 2020, 2021],
            "revenue" => &[1.0, 2.0, 4.0],
        }
        .unwrap();

        let groups = EntityGroups::from_frame(&df, "symbol", "calendarYear").unwrap();
        assert_eq!(groups.duplicates(), 1);
        assert_eq!(groups.ranges(), &[0..3]);

        let out = revenue_builder().build_grouped(&df, &groups).unwrap();
        assert_relative_eq!(values(&out, "revenueYoY")[2].unwrap(), 1.0);
    }

    #[test]
    fn test_empty_frame() {
        let df = df! {
            "symbol" => Vec::<String>::new(),
            "calendarYear" => Vec::<i64>::new(),
            "revenue" => Vec::<f64>::new(),
        }
        .unwrap();

        let groups = EntityGroups::from_frame(&df, "symbol", "calendarYear").unwrap();
        assert!(groups.is_empty());
        let out = revenue_builder().build(&df).unwrap();
        assert_eq!(out.height(), 0);
    }

    #[test]
    fn test_output_columns() {
        let builder = revenue_builder();
        assert_eq!(builder.output_columns(), vec!["revenueYoY", "revenueTrend"]);
        assert!(builder.required_columns().contains(&"calendarYear".to_string()));
    }
}
