//! End-to-end feature generation.

use crate::{
    config::FeatureConfig,
    overrides::ValueOverrides,
    ratio::RatioFeatureBuilder,
    timeseries::{EntityGroups, TimeSeriesFeatureBuilder},
};
use mktcap_traits::{
    FeatureStage, FeatureTable, MktcapError, Result, StatementFrame,
    types::{f64_column, has_column, is_numeric},
};
use polars::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// What happened while building a feature table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    /// Output rows.
    pub rows: usize,
    /// Distinct entities.
    pub entities: usize,
    /// Feature columns (excluding keys and target).
    pub features: usize,
    /// Input columns absent from the statements, treated as all-null.
    pub missing_columns: Vec<String>,
    /// Per feature, rows whose inputs were null before cleanup.
    pub rows_with_missing_inputs: BTreeMap<String, usize>,
    /// Rows repeating the previous row's `(symbol, period)` key.
    pub duplicate_keys: usize,
    /// Cells written by value overrides.
    pub overrides_applied: usize,
    /// Infinite or NaN cells replaced by zero.
    pub non_finite_replaced: usize,
    /// Null cells replaced by zero, not counting replaced non-finite cells.
    pub nulls_filled: usize,
}

/// Feature table plus the report describing how it was built.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Cleaned features.
    pub table: FeatureTable,
    /// Build report.
    pub report: PipelineReport,
}

/// Turns statement rows into a clean feature table.
///
/// Steps, in order:
/// 1. apply value overrides
/// 2. sort by `(symbol, period)`
/// 3. epsilon shift, ratios and absolute columns
/// 4. macro and passthrough columns
/// 5. growth and trend columns per entity
/// 6. replace infinities and NaN with null, then every null with `0.0`
///
/// Zero-filling also applies to absolute columns, so a missing
/// `totalAssets` reads the same as a zero one downstream.
///
/// # Example
///
/// ```ignore
/// use mktcap_features::{FeatureConfig, FeaturePipeline};
///
/// let output = FeaturePipeline::new(FeatureConfig::default()).run(&statements)?;
/// for row in output.table.rows()? {
///     println!("{} {} {}", row.symbol, row.period_year, row.target);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct FeaturePipeline {
    config: FeatureConfig,
    overrides: ValueOverrides,
}

impl FeaturePipeline {
    /// Creates a pipeline without overrides.
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            config,
            overrides: ValueOverrides::new(),
        }
    }

    /// Applies `overrides` to the statements before any feature is computed.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ValueOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// The pipeline configuration.
    pub const fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Runs every step on `statements`.
    ///
    /// # Errors
    ///
    /// Returns [`MktcapError::MissingColumn`] for an absent key column (or
    /// any absent input with `strict_columns`), [`MktcapError::InvalidData`]
    /// for null keys or a non-numeric passthrough column, and Polars errors
    /// from the underlying frame operations.
    pub fn run(&self, statements: &StatementFrame) -> Result<PipelineOutput> {
        let keys = &self.config.keys;
        let data = statements.data();
        for key in [&keys.symbol, &keys.period] {
            if !has_column(data, key) {
                return Err(MktcapError::MissingColumn(key.clone()));
            }
        }

        let mut report = PipelineReport::default();

        let (data, applied) = self.overrides.apply(data, keys)?;
        report.overrides_applied = applied;

        let data = data.sort(
            [keys.symbol.as_str(), keys.period.as_str()],
            SortMultipleOptions::default().with_maintain_order(true),
        )?;
        let groups = EntityGroups::from_frame(&data, &keys.symbol, &keys.period)?;
        report.entities = groups.len();
        report.duplicate_keys = groups.duplicates();

        let missing: Vec<String> = std::iter::once(keys.target.clone())
            .chain(self.config.input_columns())
            .filter(|column| !has_column(&data, column))
            .collect();
        if self.config.strict_columns
            && let Some(column) = missing.first()
        {
            return Err(MktcapError::MissingColumn(column.clone()));
        }
        if !missing.is_empty() {
            warn!(columns = ?missing, "statement columns missing, treating as null");
        }
        report.missing_columns = missing;

        let ratios = RatioFeatureBuilder::from_config(&self.config);
        let (mut data, ratio_report) = ratios.apply_with_report(&data)?;
        report.rows_with_missing_inputs = ratio_report.rows_with_missing_inputs;

        let direct = std::iter::once(&keys.target)
            .chain(&self.config.macro_columns)
            .chain(&self.config.passthrough_columns);
        for column in direct {
            if !has_column(&data, column) {
                let nulls: Vec<Option<f64>> = vec![None; data.height()];
                data.with_column(Series::new(column.as_str().into(), nulls))?;
            }
        }
        for column in &self.config.passthrough_columns {
            let dtype = data.column(column)?.dtype();
            if !is_numeric(dtype) {
                return Err(MktcapError::InvalidData(format!(
                    "passthrough column {column} has type {dtype}, expected a numeric column"
                )));
            }
        }

        let time_series = TimeSeriesFeatureBuilder::from_config(&self.config);
        let data = time_series.build_grouped(&data, &groups)?;

        let feature_columns = self.feature_columns(&ratios, &time_series);
        let table = self.clean(&data, &feature_columns, &mut report)?;
        report.rows = table.height();
        report.features = feature_columns.len();

        info!(
            rows = report.rows,
            entities = report.entities,
            features = report.features,
            missing_columns = report.missing_columns.len(),
            duplicate_keys = report.duplicate_keys,
            non_finite = report.non_finite_replaced,
            nulls_filled = report.nulls_filled,
            "built feature table"
        );

        Ok(PipelineOutput {
            table: FeatureTable::new(table, &keys.symbol, &keys.period, &keys.target),
            report,
        })
    }

    /// Output feature columns in order, without repeats.
    fn feature_columns(
        &self,
        ratios: &RatioFeatureBuilder,
        time_series: &TimeSeriesFeatureBuilder,
    ) -> Vec<String> {
        let keys = &self.config.keys;
        let mut seen: HashSet<&str> = [
            keys.symbol.as_str(),
            keys.period.as_str(),
            keys.target.as_str(),
        ]
        .into_iter()
        .collect();

        let ratio_outputs = ratios.output_columns();
        let series_outputs = time_series.output_columns();
        let candidates = self
            .config
            .passthrough_columns
            .iter()
            .chain(&ratio_outputs)
            .chain(&self.config.macro_columns)
            .chain(&series_outputs);

        let mut columns = Vec::new();
        for column in candidates {
            if seen.insert(column.as_str()) {
                columns.push(column.clone());
            }
        }
        columns
    }

    /// Selects keys, target and features, replacing non-finite values and
    /// nulls with zero.
    fn clean(
        &self,
        data: &DataFrame,
        feature_columns: &[String],
        report: &mut PipelineReport,
    ) -> Result<DataFrame> {
        let keys = &self.config.keys;
        let mut columns: Vec<Column> = vec![
            data.column(&keys.symbol)?.clone(),
            data.column(&keys.period)?.clone(),
        ];

        for name in std::iter::once(&keys.target).chain(feature_columns) {
            let mut values = Vec::with_capacity(data.height());
            for value in f64_column(data, name)? {
                values.push(match value {
                    Some(v) if v.is_finite() => v,
                    Some(_) => {
                        report.non_finite_replaced += 1;
                        0.0
                    }
                    None => {
                        report.nulls_filled += 1;
                        0.0
                    }
                });
            }
            columns.push(Column::new(name.as_str().into(), values));
        }

        debug!(columns = columns.len(), "cleaned feature columns");
        Ok(DataFrame::new(columns)?)
    }
}
