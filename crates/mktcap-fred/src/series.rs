//! Macro series and as-of joins onto statement rows.

use crate::Result;
use chrono::NaiveDate;
use mktcap_traits::types::date_column;
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

/// Observations of one macro indicator, sorted by date.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroObservations {
    column: String,
    observations: Vec<(NaiveDate, f64)>,
}

impl MacroObservations {
    /// Creates a series named `column`; observations are sorted by date.
    pub fn new(column: impl Into<String>, mut observations: Vec<(NaiveDate, f64)>) -> Self {
        observations.sort_by_key(|(date, _)| *date);
        Self {
            column: column.into(),
            observations,
        }
    }

    /// Output column name.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Observations in ascending date order.
    pub fn observations(&self) -> &[(NaiveDate, f64)] {
        &self.observations
    }

    /// Latest value observed on or before `date`.
    pub fn value_as_of(&self, date: NaiveDate) -> Option<f64> {
        let index = self.observations.partition_point(|(d, _)| *d <= date);
        index.checked_sub(1).map(|i| self.observations[i].1)
    }
}

/// Lays out several series on the union of their dates.
///
/// The frame has a `date` column (`YYYY-MM-DD`) followed by one nullable
/// column per series; a series without an observation on a date is null
/// there.
///
/// # Errors
///
/// Returns an error if the DataFrame cannot be built.
pub fn macro_frame(series: &[MacroObservations]) -> Result<DataFrame> {
    let dates: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|s| s.observations.iter().map(|(date, _)| *date))
        .collect();

    let mut columns = vec![Column::new(
        "date".into(),
        dates.iter().map(ToString::to_string).collect::<Vec<_>>(),
    )];
    for s in series {
        let values: Vec<Option<f64>> = dates
            .iter()
            .map(|date| {
                s.observations
                    .binary_search_by_key(date, |(d, _)| *d)
                    .ok()
                    .map(|i| s.observations[i].1)
            })
            .collect();
        columns.push(Column::new(s.column.as_str().into(), values));
    }
    Ok(DataFrame::new(columns)?)
}

/// Adds one column per series holding its latest value on or before each
/// row's `on` date.
///
/// Rows with a null or unparseable date get nulls. An existing column with
/// the same name is replaced.
///
/// # Errors
///
/// Returns an error if `on` is missing or not a date/string column.
pub fn attach_macro(df: &DataFrame, on: &str, series: &[MacroObservations]) -> Result<DataFrame> {
    let dates = date_column(df, on)?;

    let mut out = df.clone();
    for s in series {
        let values: Vec<Option<f64>> = dates
            .iter()
            .map(|date| date.and_then(|d| s.value_as_of(d)))
            .collect();
        out.with_column(Series::new(s.column.as_str().into(), values))?;
    }

    debug!(
        rows = out.height(),
        series = series.len(),
        "attached macro indicators"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mktcap_traits::types::f64_column;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn unemployment() -> MacroObservations {
        MacroObservations::new(
            "unemployment",
            vec![(day(2020, 2, 1), 3.5), (day(2020, 1, 1), 3.6), (day(2020, 3, 1), 4.4)],
        )
    }

    #[test]
    fn test_value_as_of() {
        let series = unemployment();
        assert_eq!(series.value_as_of(day(2019, 12, 31)), None);
        assert_eq!(series.value_as_of(day(2020, 1, 1)), Some(3.6));
        assert_eq!(series.value_as_of(day(2020, 2, 15)), Some(3.5));
        assert_eq!(series.value_as_of(day(2024, 1, 1)), Some(4.4));
    }

    #[test]
    fn test_attach_macro() {
        let statements = df! {
            "symbol" => &["A", "B", "C"],
            "fillingDate" => &[Some("2020-02-10"), Some("2019-06-01"), None],
        }
        .unwrap();

        let out = attach_macro(&statements, "fillingDate", &[unemployment()]).unwrap();
        assert_eq!(
            f64_column(&out, "unemployment").unwrap(),
            vec![Some(3.5), None, None]
        );
    }

    #[test]
    fn test_macro_frame_union_of_dates() {
        let vix = MacroObservations::new("vix", vec![(day(2020, 1, 15), 14.0)]);
        let df = macro_frame(&[unemployment(), vix]).unwrap();

        assert_eq!(df.height(), 4);
        assert_eq!(
            f64_column(&df, "vix").unwrap(),
            vec![None, Some(14.0), None, None]
        );
        assert_eq!(f64_column(&df, "unemployment").unwrap()[0], Some(3.6));
    }
}
