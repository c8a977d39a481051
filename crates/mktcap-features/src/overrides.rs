//! Entity-specific value patches kept outside the pipeline code.

use crate::config::KeyColumns;
use mktcap_traits::{
    Result,
    types::{f64_column, has_column, i64_column, str_column},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Sets `column` to `value` on the row of `symbol` in `year`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueOverride {
    /// Entity identifier.
    pub symbol: String,
    /// Reporting year.
    pub year: i64,
    /// Column to patch; created as all-null if absent.
    pub column: String,
    /// Replacement value.
    pub value: f64,
}

/// A table of [`ValueOverride`]s applied before feature generation.
///
/// Typical use is injecting a known previous market cap for an entity with
/// a single reporting year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueOverrides {
    overrides: Vec<ValueOverride>,
}

impl ValueOverrides {
    /// Creates an empty table.
    pub const fn new() -> Self {
        Self {
            overrides: Vec::new(),
        }
    }

    /// Adds an override.
    pub fn push(&mut self, value: ValueOverride) {
        self.overrides.push(value);
    }

    /// Number of overrides.
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// Iterates over the overrides.
    pub fn iter(&self) -> impl Iterator<Item = &ValueOverride> {
        self.overrides.iter()
    }

    /// Reads overrides from a frame with `symbol`, `year`, `column` and
    /// `value` columns. Rows with a null field are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the four columns is missing.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let symbols = str_column(df, "symbol")?;
        let years = i64_column(df, "year")?;
        let columns = str_column(df, "column")?;
        let values = f64_column(df, "value")?;

        let mut overrides = Self::new();
        for i in 0..df.height() {
            if let (Some(symbol), Some(year), Some(column), Some(value)) =
                (&symbols[i], years[i], &columns[i], values[i])
            {
                overrides.push(ValueOverride {
                    symbol: symbol.clone(),
                    year,
                    column: column.clone(),
                    value,
                });
            }
        }
        Ok(overrides)
    }

    /// Applies every override to `df`, returning the patched frame and the
    /// number of cells written.
    ///
    /// An override matching no row is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a key column is missing or a patched column is
    /// not numeric.
    pub fn apply(&self, df: &DataFrame, keys: &KeyColumns) -> Result<(DataFrame, usize)> {
        if self.is_empty() {
            return Ok((df.clone(), 0));
        }

        let symbols = str_column(df, &keys.symbol)?;
        let years = i64_column(df, &keys.period)?;

        let mut by_column: BTreeMap<&str, Vec<&ValueOverride>> = BTreeMap::new();
        for value in &self.overrides {
            by_column.entry(value.column.as_str()).or_default().push(value);
        }

        let mut out = df.clone();
        let mut applied = 0usize;
        for (column, overrides) in by_column {
            let mut values = if has_column(df, column) {
                f64_column(df, column)?
            } else {
                vec![None; df.height()]
            };

            for value in overrides {
                let mut matched = false;
                for (row, (symbol, year)) in symbols.iter().zip(&years).enumerate() {
                    if symbol.as_deref() == Some(value.symbol.as_str()) && *year == Some(value.year)
                    {
                        values[row] = Some(value.value);
                        matched = true;
                        applied += 1;
                    }
                }
                if !matched {
                    warn!(
                        symbol = %value.symbol,
                        year = value.year,
                        column = %value.column,
                        "override matches no row"
                    );
                }
            }
            out.with_column(Series::new(column.into(), values))?;
        }

        debug!(applied, overrides = self.len(), "applied value overrides");
        Ok((out, applied))
    }
}

impl FromIterator<ValueOverride> for ValueOverrides {
    fn from_iter<I: IntoIterator<Item = ValueOverride>>(iter: I) -> Self {
        Self {
            overrides: iter.into_iter().collect(),
        }
    }
}
