//! Common types used throughout the mktcap workspace.
//!
//! Tables are Polars DataFrames wrapped in thin newtypes: a
//! [`StatementFrame`] holds raw statement (and pre-joined macro) rows, a
//! [`FeatureTable`] holds the cleaned model inputs.

use crate::{MktcapError, Result};
use polars::prelude::*;

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// An entity identifier, typically a ticker symbol like "AAPL".
pub type Symbol = String;

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Container for raw financial-statement rows.
///
/// # Expected Schema
///
/// - `symbol`: entity identifier
/// - `calendarYear`: reporting year, the sort key within a symbol
/// - `fillingDate`: filing date (Polars `Date` or `YYYY-MM-DD` string)
/// - statement line items (`totalAssets`, `revenue`, ...) as numbers
/// - optionally `period`, `target` and macro indicator columns
///
/// # Example
///
/// ```no_run
/// use mktcap_traits::StatementFrame;
/// use polars::prelude::*;
///
/// let df = df! {
///     "symbol" => &["AAPL", "AAPL"],
///     "calendarYear" => &[2022i64, 2023],
///     "revenue" => &[394.3, 383.3],
/// }.unwrap();
///
/// let statements = StatementFrame::new(df);
/// assert_eq!(statements.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct StatementFrame {
    data: DataFrame,
}

impl StatementFrame {
    /// Creates a new `StatementFrame` from a DataFrame.
    pub const fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the column names.
    pub fn columns(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Checks if a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        has_column(&self.data, name)
    }

    /// Reads a column as nullable `f64` values.
    ///
    /// # Errors
    ///
    /// Returns [`MktcapError::MissingColumn`] if the column does not exist,
    /// or a Polars error if it cannot be cast to `f64`.
    pub fn f64_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        f64_column(&self.data, name)
    }
}

impl From<DataFrame> for StatementFrame {
    fn from(data: DataFrame) -> Self {
        Self::new(data)
    }
}

impl AsRef<DataFrame> for StatementFrame {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}

/// One output row of the feature pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    /// Entity identifier.
    pub symbol: Symbol,
    /// Reporting year.
    pub period_year: i64,
    /// Regression target (market capitalization).
    pub target: f64,
    /// Feature values in column order.
    pub features: Vec<(String, f64)>,
}

impl FeatureRow {
    /// Looks up a feature value by column name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.features
            .iter()
            .find(|(feature, _)| feature == name)
            .map(|(_, value)| *value)
    }
}

/// Cleaned feature matrix: one row per `(symbol, period)`.
///
/// Every column other than the symbol and period keys is a finite,
/// non-null `f64`.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    data: DataFrame,
    symbol_column: String,
    period_column: String,
    target_column: String,
}

impl FeatureTable {
    /// Wraps a cleaned DataFrame together with its key column names.
    pub fn new(
        data: DataFrame,
        symbol_column: impl Into<String>,
        period_column: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        Self {
            data,
            symbol_column: symbol_column.into(),
            period_column: period_column.into(),
            target_column: target_column.into(),
        }
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Names of the feature columns (everything except symbol, period and target).
    pub fn feature_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .filter(|name| {
                name != &self.symbol_column
                    && name != &self.period_column
                    && name != &self.target_column
            })
            .collect()
    }

    /// Materializes the table as typed rows.
    ///
    /// # Errors
    ///
    /// Returns an error if a key column is missing or has an unexpected type.
    pub fn rows(&self) -> Result<Vec<FeatureRow>> {
        let symbols = str_column(&self.data, &self.symbol_column)?;
        let periods = i64_column(&self.data, &self.period_column)?;
        let targets = if has_column(&self.data, &self.target_column) {
            f64_column(&self.data, &self.target_column)?
        } else {
            vec![None; self.data.height()]
        };

        let names = self.feature_names();
        let mut values = Vec::with_capacity(names.len());
        for name in &names {
            values.push(f64_column(&self.data, name)?);
        }

        let mut rows = Vec::with_capacity(self.data.height());
        for i in 0..self.data.height() {
            let symbol = symbols[i].clone().ok_or_else(|| {
                MktcapError::InvalidData(format!("null {} at row {i}", self.symbol_column))
            })?;
            let period_year = periods[i].ok_or_else(|| {
                MktcapError::InvalidData(format!("null {} at row {i}", self.period_column))
            })?;
            let features = names
                .iter()
                .zip(&values)
                .map(|(name, column)| (name.clone(), column[i].unwrap_or(0.0)))
                .collect();
            rows.push(FeatureRow {
                symbol,
                period_year,
                target: targets[i].unwrap_or(0.0),
                features,
            });
        }
        Ok(rows)
    }
}

impl AsRef<DataFrame> for FeatureTable {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}

/// Checks if a column exists in a DataFrame.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|s| s.as_str() == name)
}

/// Whether `dtype` is an integer or floating-point type.
pub const fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Names of the numeric columns of `df`, in frame order.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| is_numeric(c.dtype()))
        .map(|c| c.name().to_string())
        .collect()
}

/// Reads a column as nullable `f64` values, casting numeric types.
///
/// # Errors
///
/// Returns [`MktcapError::MissingColumn`] if the column does not exist.
pub fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| MktcapError::MissingColumn(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

/// Reads a column as nullable `i64` values, casting numeric types.
///
/// # Errors
///
/// Returns [`MktcapError::MissingColumn`] if the column does not exist.
pub fn i64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let column = df
        .column(name)
        .map_err(|_| MktcapError::MissingColumn(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Int64)?;
    Ok(series.i64()?.into_iter().collect())
}

/// Reads a column as nullable strings.
///
/// # Errors
///
/// Returns [`MktcapError::MissingColumn`] if the column does not exist.
pub fn str_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| MktcapError::MissingColumn(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|s| s.map(str::to_string))
        .collect())
}

/// Reads a date column, accepting Polars `Date` values or `YYYY-MM-DD` strings.
///
/// Strings with a time suffix (`2021-10-29 00:00:00`) are truncated to the
/// date part. Unparseable strings become `None`.
///
/// # Errors
///
/// Returns [`MktcapError::MissingColumn`] if the column does not exist and
/// [`MktcapError::InvalidData`] for unsupported column types.
pub fn date_column(df: &DataFrame, name: &str) -> Result<Vec<Option<Date>>> {
    let column = df
        .column(name)
        .map_err(|_| MktcapError::MissingColumn(name.to_string()))?;
    let series = column.as_materialized_series();

    match series.dtype() {
        DataType::Date => {
            let days = series.cast(&DataType::Int32)?;
            Ok(days
                .i32()?
                .into_iter()
                .map(|d| d.and_then(|d| Date::from_num_days_from_ce_opt(d + EPOCH_DAYS_FROM_CE)))
                .collect())
        }
        DataType::String => Ok(series
            .str()?
            .into_iter()
            .map(|s| s.and_then(parse_date_prefix))
            .collect()),
        other => Err(MktcapError::InvalidData(format!(
            "column {name} has type {other}, expected a date or string"
        ))),
    }
}

fn parse_date_prefix(raw: &str) -> Option<Date> {
    let trimmed = raw.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    Date::parse_from_str(head, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_statement_frame_basics() {
        let df = df! {
            "symbol" => &["AAPL", "MSFT"],
            "revenue" => &[150.0, 300.0],
        }
        .unwrap();

        let frame = StatementFrame::from(df);
        assert_eq!(frame.len(), 2);
        assert!(!frame.is_empty());
        assert!(frame.has_column("revenue"));
        assert!(!frame.has_column("totalAssets"));
        assert_eq!(frame.columns(), vec!["symbol", "revenue"]);
    }

    #[test]
    fn test_f64_values_casts_integers() {
        let df = df! {
            "revenue" => &[Some(1i64), None, Some(3)],
        }
        .unwrap();

        let values = StatementFrame::new(df).f64_values("revenue").unwrap();
        assert_eq!(values, vec![Some(1.0), None, Some(3.0)]);
    }

    #[test]
    fn test_missing_column_error() {
        let frame = StatementFrame::new(DataFrame::default());
        let err = frame.f64_values("revenue").unwrap_err();
        assert!(matches!(err, MktcapError::MissingColumn(name) if name == "revenue"));
    }

    #[test]
    fn test_date_column_from_strings() {
        let df = df! {
            "fillingDate" => &["2023-11-03", "2022-10-28 00:00:00", "not a date"],
        }
        .unwrap();

        let dates = date_column(&df, "fillingDate").unwrap();
        assert_eq!(dates[0].unwrap().ordinal(), 307);
        assert_eq!(dates[1].unwrap().year(), 2022);
        assert!(dates[2].is_none());
    }

    #[test]
    fn test_numeric_columns() {
        let df = df! {
            "symbol" => &["A"],
            "calendarYear" => &[2020i32],
            "revenue" => &[1.5],
        }
        .unwrap();
        assert_eq!(numeric_columns(&df), vec!["calendarYear", "revenue"]);
        assert!(!is_numeric(&DataType::String));
    }

    #[test]
    fn test_feature_table_rows() {
        let df = df! {
            "symbol" => &["A", "B"],
            "calendarYear" => &[2020i64, 2021],
            "target" => &[10.0, 20.0],
            "revenue" => &[1.0, 2.0],
        }
        .unwrap();

        let table = FeatureTable::new(df, "symbol", "calendarYear", "target");
        assert_eq!(table.feature_names(), vec!["revenue"]);

        let rows = table.rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].symbol, "B");
        assert_eq!(rows[1].period_year, 2021);
        assert_eq!(rows[1].get("revenue"), Some(2.0));
        assert_eq!(rows[1].get("missing"), None);
    }
}
