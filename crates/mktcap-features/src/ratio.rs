//! Ratio features with safe denominators.

use crate::{
    catalog::RatioDefinition,
    config::FeatureConfig,
    term::InputColumns,
};
use mktcap_traits::{
    FeatureStage, MktcapError, Result,
    types::{f64_column, has_column},
};
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// What the ratio stage found while computing features.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RatioReport {
    /// Input columns absent from the table, treated as all-null.
    pub missing_columns: Vec<String>,
    /// Per feature, the number of rows with a null input.
    pub rows_with_missing_inputs: BTreeMap<String, usize>,
}

/// Computes normalized ratios from statement line items.
///
/// Before any ratio is computed, `epsilon` is added to every epsilon column
/// so that zero denominators such as `totalAssets = 0` stay finite. Absolute
/// columns are emitted with the shift applied. Ratios with a zero or null
/// denominator that is not shifted produce `inf`, `NaN` or null; cleanup
/// is left to the pipeline.
///
/// # Example
///
/// ```ignore
/// use mktcap_features::{FeatureConfig, RatioFeatureBuilder};
///
/// let builder = RatioFeatureBuilder::from_config(&FeatureConfig::default());
/// let (with_ratios, report) = builder.apply_with_report(statements.data())?;
/// ```
#[derive(Debug, Clone)]
pub struct RatioFeatureBuilder {
    ratios: Vec<RatioDefinition>,
    epsilon: f64,
    epsilon_columns: Vec<String>,
    absolute_columns: Vec<String>,
    strict: bool,
}

impl RatioFeatureBuilder {
    /// Creates a builder for `ratios` with no epsilon shift and no absolute columns.
    pub const fn new(ratios: Vec<RatioDefinition>) -> Self {
        Self {
            ratios,
            epsilon: 0.0,
            epsilon_columns: Vec::new(),
            absolute_columns: Vec::new(),
            strict: false,
        }
    }

    /// Creates a builder from the ratio-related parts of `config`.
    pub fn from_config(config: &FeatureConfig) -> Self {
        Self {
            ratios: config.ratios.clone(),
            epsilon: config.epsilon,
            epsilon_columns: config.epsilon_columns.clone(),
            absolute_columns: config.absolute_columns.clone(),
            strict: config.strict_columns,
        }
    }

    /// Adds `epsilon` to `columns` before computing ratios.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64, columns: &[&str]) -> Self {
        self.epsilon = epsilon;
        self.epsilon_columns = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Emits `columns` as features after the epsilon shift.
    #[must_use]
    pub fn with_absolute_columns(mut self, columns: &[&str]) -> Self {
        self.absolute_columns = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Fail on missing input columns instead of treating them as null.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Configured ratios.
    pub fn ratios(&self) -> &[RatioDefinition] {
        &self.ratios
    }

    /// Computes ratios and reports missing inputs.
    ///
    /// # Errors
    ///
    /// Returns [`MktcapError::MissingColumn`] for an absent input column in
    /// strict mode, or a Polars error if a column cannot be read as `f64`.
    pub fn apply_with_report(&self, data: &DataFrame) -> Result<(DataFrame, RatioReport)> {
        let rows = data.height();
        let mut report = RatioReport::default();

        let missing = self.missing_columns(data);
        if self.strict
            && let Some(column) = missing.first()
        {
            return Err(MktcapError::MissingColumn(column.clone()));
        }
        report.missing_columns = missing;

        let mut inputs = InputColumns::new();
        for column in self.required_columns() {
            let mut values = if has_column(data, &column) {
                f64_column(data, &column)?
            } else {
                vec![None; rows]
            };
            if self.epsilon_columns.contains(&column) {
                for value in values.iter_mut().flatten() {
                    *value += self.epsilon;
                }
            }
            inputs.insert(column, values);
        }

        if !report.missing_columns.is_empty() {
            warn!(
                columns = ?report.missing_columns,
                "input columns missing, treating as null"
            );
        }

        let mut out = data.clone();
        for column in &self.absolute_columns {
            let values = inputs.get(column).cloned().unwrap_or_else(|| vec![None; rows]);
            count_missing(&mut report, column, &values);
            out.with_column(Series::new(column.as_str().into(), values))?;
        }

        for ratio in &self.ratios {
            let numerator = ratio.numerator.evaluate(&inputs, rows);
            let denominator = ratio.denominator.evaluate(&inputs, rows);
            let values: Vec<Option<f64>> = numerator
                .iter()
                .zip(&denominator)
                .map(|(n, d)| Some((*n)? / (*d)?))
                .collect();
            count_missing(&mut report, &ratio.name, &values);
            out.with_column(Series::new(ratio.name.as_str().into(), values))?;
        }

        debug!(
            rows,
            ratios = self.ratios.len(),
            absolute = self.absolute_columns.len(),
            "computed ratio features"
        );
        Ok((out, report))
    }
}

fn count_missing(report: &mut RatioReport, name: &str, values: &[Option<f64>]) {
    let nulls = values.iter().filter(|v| v.is_none()).count();
    if nulls > 0 {
        report.rows_with_missing_inputs.insert(name.to_string(), nulls);
    }
}

impl FeatureStage for RatioFeatureBuilder {
    fn name(&self) -> &str {
        "ratios"
    }

    fn required_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        let fields = self.ratios.iter().flat_map(RatioDefinition::fields);
        for column in fields.chain(self.absolute_columns.iter().cloned()) {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        columns
    }

    fn output_columns(&self) -> Vec<String> {
        self.absolute_columns
            .iter()
            .cloned()
            .chain(self.ratios.iter().map(|r| r.name.clone()))
            .collect()
    }

    fn apply(&self, data: &DataFrame) -> Result<DataFrame> {
        self.apply_with_report(data).map(|(out, _)| out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DENOMINATOR_EPSILON, EPSILON_COLUMNS, FeatureFamily, default_ratios};
    use crate::term::Term;
    use approx::assert_relative_eq;

    fn column(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        f64_column(df, name).unwrap()
    }

    #[test]
    fn test_zero_assets_uses_epsilon_denominator() {
        let df = df! {
            "totalAssets" => &[0.0, 200.0],
            "cashAndCashEquivalents" => &[5.0, 50.0],
        }
        .unwrap();

        let builder = RatioFeatureBuilder::new(vec![RatioDefinition::simple(
            "cashAndEquivalentsToAssets",
            FeatureFamily::BalanceSheet,
            "cashAndCashEquivalents",
            "totalAssets",
        )])
        .with_epsilon(DENOMINATOR_EPSILON, EPSILON_COLUMNS)
        .with_absolute_columns(&["totalAssets"]);

        let out = builder.apply(&df).unwrap();
        let ratio = column(&out, "cashAndEquivalentsToAssets");
        assert_relative_eq!(ratio[0].unwrap(), 5.0 / 0.001001);
        assert!(ratio[0].unwrap().is_finite());
        assert_relative_eq!(ratio[1].unwrap(), 50.0 / 200.001001);

        let assets = column(&out, "totalAssets");
        assert_relative_eq!(assets[0].unwrap(), 0.001001);
    }

    #[test]
    fn test_unshifted_zero_denominator_is_infinite() {
        let df = df! {
            "netIncome" => &[10.0],
            "operatingIncome" => &[0.0],
        }
        .unwrap();
        let builder = RatioFeatureBuilder::new(vec![RatioDefinition::simple(
            "x",
            FeatureFamily::Composite,
            "netIncome",
            "operatingIncome",
        )]);
        let out = builder.apply(&df).unwrap();
        assert!(column(&out, "x")[0].unwrap().is_infinite());
    }

    #[test]
    fn test_null_inputs_counted() {
        let df = df! {
            "revenue" => &[Some(100.0), None, Some(50.0)],
            "netIncome" => &[Some(10.0), Some(5.0), None],
        }
        .unwrap();
        let builder = RatioFeatureBuilder::new(vec![RatioDefinition::simple(
            "netIncomeToRevenue",
            FeatureFamily::IncomeStatement,
            "netIncome",
            "revenue",
        )]);

        let (out, report) = builder.apply_with_report(&df).unwrap();
        let values = column(&out, "netIncomeToRevenue");
        assert_relative_eq!(values[0].unwrap(), 0.1);
        assert!(values[1].is_none());
        assert!(values[2].is_none());
        assert_eq!(report.rows_with_missing_inputs.get("netIncomeToRevenue"), Some(&2));
        assert!(report.missing_columns.is_empty());
    }

    #[test]
    fn test_missing_column_lenient_and_strict() {
        let df = df! {
            "revenue" => &[100.0],
        }
        .unwrap();
        let ratios = vec![RatioDefinition::new(
            "dividendsPaidToRevenue",
            FeatureFamily::CashFlow,
            Term::abs_field("dividendsPaid"),
            Term::field("revenue"),
        )];

        let (out, report) = RatioFeatureBuilder::new(ratios.clone())
            .apply_with_report(&df)
            .unwrap();
        assert_eq!(report.missing_columns, vec!["dividendsPaid"]);
        assert!(column(&out, "dividendsPaidToRevenue")[0].is_none());

        let err = RatioFeatureBuilder::new(ratios).strict(true).apply(&df).unwrap_err();
        assert!(matches!(err, MktcapError::MissingColumn(name) if name == "dividendsPaid"));
    }

    #[test]
    fn test_net_debt_to_ebitda() {
        let df = df! {
            "totalDebt" => &[500.0],
            "cashAndCashEquivalents" => &[100.0],
            "shortTermInvestments" => &[50.0],
            "longTermInvestments" => &[50.0],
            "ebitda" => &[100.0],
        }
        .unwrap();
        let ratios: Vec<_> = default_ratios()
            .into_iter()
            .filter(|r| r.name == "netDebtToEBITDA")
            .collect();
        let out = RatioFeatureBuilder::new(ratios).apply(&df).unwrap();
        assert_relative_eq!(column(&out, "netDebtToEBITDA")[0].unwrap(), 3.0);
    }

    #[test]
    fn test_stage_columns() {
        let builder = RatioFeatureBuilder::from_config(&FeatureConfig::default());
        let outputs = builder.output_columns();
        assert_eq!(&outputs[..2], &["totalAssets".to_string(), "revenue".to_string()]);
        assert!(outputs.contains(&"roe".to_string()));
        assert!(builder.required_columns().contains(&"commonStockRepurchased".to_string()));
    }
}
