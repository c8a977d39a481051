//! Feature catalogue: default ratios, denominators and macro indicators.
//!
//! Field names follow the Financial Modeling Prep statement schema
//! (`totalAssets`, `cashAndCashEquivalents`, ...).

use crate::term::Term;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Constant added to near-zero-prone denominators before dividing.
///
/// Small next to any real balance-sheet or income figure, large enough to
/// keep a zero denominator from blowing up.
pub const DENOMINATOR_EPSILON: f64 = 0.001001;

/// Columns that receive [`DENOMINATOR_EPSILON`] before ratios are computed.
pub const EPSILON_COLUMNS: &[&str] = &[
    "totalAssets",
    "totalDebt",
    "revenue",
    "freeCashFlow",
    "ebitda",
    "totalStockholdersEquity",
];

/// Scale columns passed through as features.
pub const ABSOLUTE_COLUMNS: &[&str] = &["totalAssets", "revenue"];

/// A macroeconomic indicator and the FRED series it is sourced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroSeries {
    /// Column name in the statement table.
    pub column: &'static str,
    /// FRED series identifier.
    pub series_id: &'static str,
    /// Human-readable description.
    pub description: &'static str,
}

/// Default macro indicators joined onto statement rows.
pub const MACRO_SERIES: &[MacroSeries] = &[
    MacroSeries { column: "brent", series_id: "DCOILBRENTEU", description: "Brent crude oil spot price" },
    MacroSeries { column: "wti", series_id: "DCOILWTICO", description: "WTI crude oil spot price" },
    MacroSeries { column: "gdp", series_id: "GDP", description: "Nominal gross domestic product" },
    MacroSeries { column: "realGdp", series_id: "GDPC1", description: "Real gross domestic product" },
    MacroSeries { column: "unemployment", series_id: "UNRATE", description: "Unemployment rate" },
    MacroSeries { column: "cpi", series_id: "CPIAUCSL", description: "Consumer price index, all items" },
    MacroSeries { column: "coreCpi", series_id: "CPILFESL", description: "CPI less food and energy" },
    MacroSeries { column: "ppi", series_id: "PPIACO", description: "Producer price index, all commodities" },
    MacroSeries { column: "fedFunds", series_id: "FEDFUNDS", description: "Effective federal funds rate" },
    MacroSeries { column: "treasury10y", series_id: "DGS10", description: "10-year Treasury yield" },
    MacroSeries { column: "treasury2y", series_id: "DGS2", description: "2-year Treasury yield" },
    MacroSeries { column: "treasury3m", series_id: "DGS3MO", description: "3-month Treasury yield" },
    MacroSeries { column: "yieldSpread", series_id: "T10Y2Y", description: "10-year minus 2-year Treasury spread" },
    MacroSeries { column: "m2", series_id: "M2SL", description: "M2 money stock" },
    MacroSeries { column: "industrialProduction", series_id: "INDPRO", description: "Industrial production index" },
    MacroSeries { column: "retailSales", series_id: "RSAFS", description: "Advance retail sales" },
    MacroSeries { column: "housingStarts", series_id: "HOUST", description: "Housing starts" },
    MacroSeries { column: "consumerSentiment", series_id: "UMCSENT", description: "University of Michigan consumer sentiment" },
    MacroSeries { column: "dollarIndex", series_id: "DTWEXBGS", description: "Broad trade-weighted US dollar index" },
    MacroSeries { column: "vix", series_id: "VIXCLS", description: "CBOE volatility index" },
    MacroSeries { column: "corporateSpread", series_id: "BAMLC0A0CM", description: "US corporate bond option-adjusted spread" },
    MacroSeries { column: "savingRate", series_id: "PSAVERT", description: "Personal saving rate" },
];

/// Column names of [`MACRO_SERIES`].
pub fn macro_columns() -> Vec<String> {
    MACRO_SERIES.iter().map(|m| m.column.to_string()).collect()
}

/// Feature family classification.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureFamily {
    /// Balance-sheet items over total assets
    BalanceSheet,
    /// Income-statement items over revenue
    IncomeStatement,
    /// Cash-flow items over revenue
    CashFlow,
    /// Ratios mixing statements or non-standard denominators
    Composite,
    /// Absolute scale values
    Absolute,
    /// Macroeconomic indicators
    Macro,
}

impl FeatureFamily {
    /// Get a human-readable description of the family.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::BalanceSheet => "Balance-sheet items normalized by total assets",
            Self::IncomeStatement => "Income-statement items normalized by revenue",
            Self::CashFlow => "Cash-flow items normalized by revenue",
            Self::Composite => "Leverage, return and payout ratios",
            Self::Absolute => "Absolute scale values",
            Self::Macro => "Macroeconomic indicators",
        }
    }
}

/// One configured ratio: `numerator / denominator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioDefinition {
    /// Output column name.
    pub name: String,
    /// Family the ratio belongs to.
    pub family: FeatureFamily,
    /// Numerator expression.
    pub numerator: Term,
    /// Denominator expression.
    pub denominator: Term,
}

impl RatioDefinition {
    /// A ratio between two arbitrary terms.
    pub fn new(
        name: impl Into<String>,
        family: FeatureFamily,
        numerator: Term,
        denominator: Term,
    ) -> Self {
        Self {
            name: name.into(),
            family,
            numerator,
            denominator,
        }
    }

    /// A ratio between two columns.
    pub fn simple(
        name: impl Into<String>,
        family: FeatureFamily,
        numerator: &str,
        denominator: &str,
    ) -> Self {
        Self::new(name, family, Term::field(numerator), Term::field(denominator))
    }

    /// Columns read by this ratio.
    pub fn fields(&self) -> Vec<String> {
        let mut fields = self.numerator.fields();
        for field in self.denominator.fields() {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        fields
    }
}

/// Balance-sheet line items normalized by total assets: (feature, field).
const ASSET_RATIOS: &[(&str, &str)] = &[
    ("cashAndEquivalentsToAssets", "cashAndCashEquivalents"),
    ("shortTermInvestmentsToAssets", "shortTermInvestments"),
    ("netReceivablesToAssets", "netReceivables"),
    ("inventoryToAssets", "inventory"),
    ("otherCurrentAssetsToAssets", "otherCurrentAssets"),
    ("propertyPlantEquipmentNetToAssets", "propertyPlantEquipmentNet"),
    ("intangibleAssetsToAssets", "intangibleAssets"),
    ("longTermInvestmentsToAssets", "longTermInvestments"),
    ("otherNonCurrentAssetsToAssets", "otherNonCurrentAssets"),
    ("accountPayablesToAssets", "accountPayables"),
    ("shortTermDebtToAssets", "shortTermDebt"),
    ("deferredRevenueToAssets", "deferredRevenue"),
    ("otherCurrentLiabilitiesToAssets", "otherCurrentLiabilities"),
    ("longTermDebtToAssets", "longTermDebt"),
    ("otherNonCurrentLiabilitiesToAssets", "otherNonCurrentLiabilities"),
    ("retainedEarningsToAssets", "retainedEarnings"),
    ("totalStockholdersEquityToAssets", "totalStockholdersEquity"),
];

const INCOME_RATIOS: &[(&str, &str)] = &[
    ("costOfRevenueToRevenue", "costOfRevenue"),
    ("researchAndDevelopmentExpensesToRevenue", "researchAndDevelopmentExpenses"),
    (
        "sellingGeneralAndAdministrativeExpensesToRevenue",
        "sellingGeneralAndAdministrativeExpenses",
    ),
    ("ebitdaToRevenue", "ebitda"),
    ("operatingIncomeToRevenue", "operatingIncome"),
    ("netIncomeToRevenue", "netIncome"),
];

const CASH_FLOW_RATIOS: &[(&str, &str)] = &[
    ("stockBasedCompensationToRevenue", "stockBasedCompensation"),
    ("depreciationAndAmortizationToRevenue", "depreciationAndAmortization"),
    ("changeInWorkingCapitalToRevenue", "changeInWorkingCapital"),
    ("freeCashFlowToRevenue", "freeCashFlow"),
    ("capitalExpenditureToRevenue", "capitalExpenditure"),
    ("acquisitionsNetToRevenue", "acquisitionsNet"),
    ("purchasesOfInvestmentsToRevenue", "purchasesOfInvestments"),
];

/// Cash, short-term and long-term investments.
fn true_cash() -> Term {
    Term::sum_of(&[
        "cashAndCashEquivalents",
        "shortTermInvestments",
        "longTermInvestments",
    ])
}

/// Shares bought back net of shares issued.
fn net_shares_repurchased() -> Term {
    Term::difference(
        Term::abs_field("commonStockRepurchased"),
        Term::field("commonStockIssued"),
    )
}

/// The default ratio set.
#[must_use]
pub fn default_ratios() -> Vec<RatioDefinition> {
    let mut ratios = Vec::with_capacity(40);

    for (name, field) in ASSET_RATIOS {
        ratios.push(RatioDefinition::simple(
            *name,
            FeatureFamily::BalanceSheet,
            field,
            "totalAssets",
        ));
    }

    // Debt rebuilt from its parts, so it carries its own epsilon.
    let total_debt = Term::Sum(vec![
        Term::field("shortTermDebt"),
        Term::field("longTermDebt"),
        Term::Constant(DENOMINATOR_EPSILON),
    ]);
    ratios.push(RatioDefinition::new(
        "netDebtToTotalDebt",
        FeatureFamily::Composite,
        Term::difference(total_debt.clone(), true_cash()),
        total_debt,
    ));

    for (name, field) in INCOME_RATIOS {
        ratios.push(RatioDefinition::simple(
            *name,
            FeatureFamily::IncomeStatement,
            field,
            "revenue",
        ));
    }

    for (name, field) in CASH_FLOW_RATIOS {
        ratios.push(RatioDefinition::simple(
            *name,
            FeatureFamily::CashFlow,
            field,
            "revenue",
        ));
    }
    ratios.push(RatioDefinition::new(
        "netSharesRepurchasedToRevenue",
        FeatureFamily::CashFlow,
        net_shares_repurchased(),
        Term::field("revenue"),
    ));
    ratios.push(RatioDefinition::new(
        "dividendsPaidToRevenue",
        FeatureFamily::CashFlow,
        Term::abs_field("dividendsPaid"),
        Term::field("revenue"),
    ));
    // A negative free cash flow flips the sign of this ratio: paying out
    // while burning cash reads as a negative payout share.
    ratios.push(RatioDefinition::new(
        "freeCashFlowGivenToShareholders",
        FeatureFamily::Composite,
        Term::Sum(vec![net_shares_repurchased(), Term::abs_field("dividendsPaid")]),
        Term::field("freeCashFlow"),
    ));

    ratios.push(RatioDefinition::simple(
        "PPEtoSales",
        FeatureFamily::Composite,
        "propertyPlantEquipmentNet",
        "revenue",
    ));
    ratios.push(RatioDefinition::new(
        "netDebtToEBITDA",
        FeatureFamily::Composite,
        Term::difference(Term::field("totalDebt"), true_cash()),
        Term::field("ebitda"),
    ));
    ratios.push(RatioDefinition::simple(
        "roe",
        FeatureFamily::Composite,
        "netIncome",
        "totalStockholdersEquity",
    ));

    ratios
}

/// Metadata about a feature column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureInfo {
    /// Column name.
    pub name: String,
    /// Family classification.
    pub family: FeatureFamily,
    /// Input columns the feature is derived from.
    pub inputs: Vec<String>,
}

/// Get information about all default base features.
#[must_use]
pub fn available_features() -> Vec<FeatureInfo> {
    let mut features: Vec<FeatureInfo> = ABSOLUTE_COLUMNS
        .iter()
        .map(|name| FeatureInfo {
            name: (*name).to_string(),
            family: FeatureFamily::Absolute,
            inputs: vec![(*name).to_string()],
        })
        .collect();

    features.extend(default_ratios().into_iter().map(|ratio| FeatureInfo {
        inputs: ratio.fields(),
        name: ratio.name,
        family: ratio.family,
    }));

    features.extend(MACRO_SERIES.iter().map(|series| FeatureInfo {
        name: series.column.to_string(),
        family: FeatureFamily::Macro,
        inputs: vec![series.column.to_string()],
    }));

    features
}

/// Get all default features in a family.
#[must_use]
pub fn features_by_family(family: FeatureFamily) -> Vec<FeatureInfo> {
    available_features()
        .into_iter()
        .filter(|info| info.family == family)
        .collect()
}

/// Get information about a default feature by name.
#[must_use]
pub fn get_feature_info(name: &str) -> Option<FeatureInfo> {
    available_features()
        .into_iter()
        .find(|info| info.name == name)
}
