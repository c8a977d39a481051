//! Percentile clipping of numeric columns.

use mktcap_traits::{
    MktcapError, Result,
    stats::{finite_values, quantile},
    types::{f64_column, has_column, numeric_columns},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Configuration for [`Winsorizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WinsorizerConfig {
    /// Columns to clip; `None` means every numeric column at fit time.
    pub columns: Option<Vec<String>>,

    /// Lower percentile, as a fraction (default: 0.01)
    pub lower_percentile: f64,

    /// Upper percentile, as a fraction (default: 0.99)
    pub upper_percentile: f64,
}

impl Default for WinsorizerConfig {
    fn default() -> Self {
        Self {
            columns: None,
            lower_percentile: 0.01,
            upper_percentile: 0.99,
        }
    }
}

/// Clips columns to bounds learned from a training table.
///
/// Bounds are linear-interpolated quantiles over the non-null finite values
/// of each column. Once fitted (or built from known bounds with
/// [`with_clip_values`](Self::with_clip_values)) the same bounds are applied
/// to any later table.
///
/// # Example
///
/// ```ignore
/// use mktcap_features::{Winsorizer, WinsorizerConfig};
///
/// let mut winsorizer = Winsorizer::new(WinsorizerConfig::default())?;
/// let train = winsorizer.fit_transform(&train)?;
/// let test = winsorizer.transform(&test)?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Winsorizer {
    config: WinsorizerConfig,
    bounds: BTreeMap<String, (f64, f64)>,
}

impl Winsorizer {
    /// Creates an unfitted winsorizer.
    ///
    /// # Errors
    ///
    /// Returns [`MktcapError::InvalidData`] unless
    /// `0 <= lower_percentile < upper_percentile <= 1`.
    pub fn new(config: WinsorizerConfig) -> Result<Self> {
        let (lower, upper) = (config.lower_percentile, config.upper_percentile);
        if !(0.0..=1.0).contains(&lower) || !(0.0..=1.0).contains(&upper) || lower >= upper {
            return Err(MktcapError::InvalidData(format!(
                "invalid winsorizing percentiles {lower}..{upper}"
            )));
        }
        Ok(Self {
            config,
            bounds: BTreeMap::new(),
        })
    }

    /// Creates a winsorizer with known per-column bounds.
    pub fn with_clip_values(bounds: BTreeMap<String, (f64, f64)>) -> Self {
        Self {
            config: WinsorizerConfig {
                columns: Some(bounds.keys().cloned().collect()),
                ..Default::default()
            },
            bounds,
        }
    }

    /// Learned or preset bounds, keyed by column.
    pub const fn bounds(&self) -> &BTreeMap<String, (f64, f64)> {
        &self.bounds
    }

    /// Whether bounds are available.
    pub fn is_fitted(&self) -> bool {
        !self.bounds.is_empty()
    }

    /// Learns bounds from `df` for columns that have none yet. Preset and
    /// previously fitted bounds are kept. Columns without any finite value
    /// get no bounds.
    ///
    /// # Errors
    ///
    /// Returns [`MktcapError::MissingColumn`] for a configured column absent
    /// from `df`.
    pub fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let columns = self
            .config
            .columns
            .clone()
            .unwrap_or_else(|| numeric_columns(df));

        let mut bounds = self.bounds.clone();
        for column in columns {
            if bounds.contains_key(&column) {
                continue;
            }
            let values = finite_values(&f64_column(df, &column)?);
            let lower = quantile(&values, self.config.lower_percentile);
            let upper = quantile(&values, self.config.upper_percentile);
            if let (Some(lower), Some(upper)) = (lower, upper) {
                bounds.insert(column, (lower, upper));
            }
        }

        debug!(columns = bounds.len(), "fitted winsorizer bounds");
        self.bounds = bounds;
        Ok(())
    }

    /// Clips every bounded column of `df`; other columns are unchanged.
    /// Nulls stay null.
    ///
    /// # Errors
    ///
    /// Returns [`MktcapError::InvalidData`] before fitting and
    /// [`MktcapError::MissingColumn`] for a bounded column absent from `df`.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted() {
            return Err(MktcapError::InvalidData(
                "winsorizer has no bounds; call fit first".to_string(),
            ));
        }

        let mut out = df.clone();
        for (column, (lower, upper)) in &self.bounds {
            if !has_column(df, column) {
                return Err(MktcapError::MissingColumn(column.clone()));
            }
            let clipped: Vec<Option<f64>> = f64_column(df, column)?
                .into_iter()
                .map(|v| v.map(|v| if v.is_nan() { v } else { v.max(*lower).min(*upper) }))
                .collect();
            out.with_column(Series::new(column.as_str().into(), clipped))?;
        }
        Ok(out)
    }

    /// Fits on `df` and clips it.
    ///
    /// # Errors
    ///
    /// See [`fit`](Self::fit) and [`transform`](Self::transform).
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }
}
