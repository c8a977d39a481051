//! Calendar parts of date columns.

use chrono::Datelike;
use mktcap_traits::{Date, Result, types::date_column};
use polars::prelude::*;

/// Numeric parts of a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    /// Date as `yyyymmdd`.
    pub as_int: i64,
    /// Month, 1-12.
    pub month: i64,
    /// Calendar year.
    pub year: i64,
    /// Day of year clipped to `[1, 365]`, so Dec 31 of leap years folds onto day 365.
    pub yday: i64,
}

impl DateParts {
    /// Splits a date into its numeric parts.
    pub fn from_date(date: Date) -> Self {
        let year = i64::from(date.year());
        let month = i64::from(date.month());
        let day = i64::from(date.day());
        Self {
            as_int: year * 10_000 + month * 100 + day,
            month,
            year,
            yday: i64::from(date.ordinal()).clamp(1, 365),
        }
    }
}

/// Appends `<column>_int`, `<column>_month`, `<column>_year` and
/// `<column>_yday` to `df`.
///
/// Null or unparseable dates produce nulls in every derived column.
///
/// # Errors
///
/// Returns an error if the column is missing or is neither a date nor a
/// string column.
///
/// # Example
///
/// ```ignore
/// let with_parts = add_date_parts(&filings, "fillingDate")?;
/// let yday = with_parts.column("fillingDate_yday")?;
/// ```
pub fn add_date_parts(df: &DataFrame, column: &str) -> Result<DataFrame> {
    let parts: Vec<Option<DateParts>> = date_column(df, column)?
        .into_iter()
        .map(|d| d.map(DateParts::from_date))
        .collect();

    let pick = |f: fn(&DateParts) -> i64| -> Vec<Option<i64>> {
        parts.iter().map(|p| p.as_ref().map(f)).collect()
    };

    let mut out = df.clone();
    out.with_column(Series::new(
        format!("{column}_int").into(),
        pick(|p| p.as_int),
    ))?;
    out.with_column(Series::new(
        format!("{column}_month").into(),
        pick(|p| p.month),
    ))?;
    out.with_column(Series::new(
        format!("{column}_year").into(),
        pick(|p| p.year),
    ))?;
    out.with_column(Series::new(
        format!("{column}_yday").into(),
        pick(|p| p.yday),
    ))?;
    Ok(out)
}
