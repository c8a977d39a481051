//! Column profiling and data-quality checks.

use mktcap_traits::{
    Result, stats,
    types::{f64_column, numeric_columns, str_column},
};
use polars::prelude::*;
use std::collections::HashMap;

const LOW_PERCENTILES: [(&str, f64); 5] = [
    ("1%", 0.01),
    ("2%", 0.02),
    ("3%", 0.03),
    ("4%", 0.04),
    ("5%", 0.05),
];

const HIGH_PERCENTILES: [(&str, f64); 5] = [
    ("95%", 0.95),
    ("96%", 0.96),
    ("97%", 0.97),
    ("98%", 0.98),
    ("99%", 0.99),
];

/// Summarizes every numeric column of `df`, one output row per column.
///
/// Output columns: `feature`, `nulls`, `nulls_pct`, `min`, `1%`..`5%`,
/// `mean`, `median`, `95%`..`99%`, `max`, `std`, `var`, `skewness`,
/// `kurtosis`. Statistics use the finite values only; a column without
/// any gets nulls.
///
/// # Errors
///
/// Returns a Polars error if a column cannot be read as `f64`.
pub fn describe(df: &DataFrame) -> Result<DataFrame> {
    let names = numeric_columns(df);
    let height = df.height();

    let labels: Vec<&str> = std::iter::once("min")
        .chain(LOW_PERCENTILES.iter().map(|(label, _)| *label))
        .chain(["mean", "median"])
        .chain(HIGH_PERCENTILES.iter().map(|(label, _)| *label))
        .chain(["max", "std", "var", "skewness", "kurtosis"])
        .collect();

    let mut nulls = Vec::with_capacity(names.len());
    let mut nulls_pct = Vec::with_capacity(names.len());
    let mut table: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(names.len()); labels.len()];

    for name in &names {
        let raw = f64_column(df, name)?;
        let missing = raw.iter().filter(|v| v.is_none()).count();
        nulls.push(missing as u64);
        nulls_pct.push(if height == 0 {
            0.0
        } else {
            missing as f64 / height as f64 * 100.0
        });

        let values = stats::finite_values(&raw);
        let mut summary = vec![values.iter().copied().reduce(f64::min)];
        summary.extend(LOW_PERCENTILES.iter().map(|(_, q)| stats::quantile(&values, *q)));
        summary.push(stats::mean(&values));
        summary.push(stats::median(&values));
        summary.extend(HIGH_PERCENTILES.iter().map(|(_, q)| stats::quantile(&values, *q)));
        summary.push(values.iter().copied().reduce(f64::max));
        summary.push(stats::std_dev(&values));
        summary.push(stats::variance(&values));
        summary.push(stats::skewness(&values));
        summary.push(stats::kurtosis(&values));

        for (column, value) in table.iter_mut().zip(summary) {
            column.push(value);
        }
    }

    let mut columns: Vec<Column> = vec![
        Column::new("feature".into(), names.clone()),
        Column::new("nulls".into(), nulls),
        Column::new("nulls_pct".into(), nulls_pct),
    ];
    columns.extend(
        labels
            .into_iter()
            .zip(table)
            .map(|(label, values)| Column::new(label.into(), values)),
    );
    Ok(DataFrame::new(columns)?)
}

/// Returns every row of `df` whose key in `columns` occurs more than once.
///
/// Null key parts compare equal to each other.
///
/// # Errors
///
/// Returns [`MktcapError::MissingColumn`](mktcap_traits::MktcapError::MissingColumn)
/// for an absent key column.
pub fn duplicate_keys(df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
    let keys = columns
        .iter()
        .map(|c| str_column(df, c))
        .collect::<Result<Vec<_>>>()?;

    let row_key = |row: usize| {
        keys.iter()
            .map(|column| column[row].as_deref())
            .collect::<Vec<Option<&str>>>()
    };

    let mut counts: HashMap<Vec<Option<&str>>, usize> = HashMap::new();
    for row in 0..df.height() {
        *counts.entry(row_key(row)).or_default() += 1;
    }

    let mask: BooleanChunked = (0..df.height())
        .map(|row| counts.get(&row_key(row)).is_some_and(|n| *n > 1))
        .collect();
    Ok(df.filter(&mask)?)
}
