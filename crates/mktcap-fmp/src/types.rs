//! Data types for FMP API responses.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Reporting period for financial statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    /// Annual reports (10-K filings).
    #[default]
    Annual,
    /// Quarterly reports (10-Q filings).
    Quarter,
}

impl Period {
    /// Get the API parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarter => "quarter",
        }
    }
}

/// One income, balance-sheet or cash-flow statement.
///
/// The identifying fields are typed; every other field is kept as raw JSON
/// under its FMP camelCase name, so new line items flow through without
/// code changes. Both the legacy (`calendarYear`, `fillingDate`) and the
/// stable (`fiscalYear`, `filingDate`) field names are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementRecord {
    /// Period end date.
    pub date: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Reporting period label (`FY`, `Q1`, ...).
    #[serde(default)]
    pub period: Option<String>,
    /// Reporting year, a number or a numeric string.
    #[serde(default, alias = "fiscalYear")]
    pub calendar_year: Option<Value>,
    /// Filing date.
    #[serde(default, alias = "filingDate")]
    pub filling_date: Option<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

impl StatementRecord {
    /// Parse the period end date.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_day(&self.date)
    }

    /// Parse the filing date.
    #[must_use]
    pub fn parsed_filing_date(&self) -> Option<NaiveDate> {
        self.filling_date.as_deref().and_then(parse_day)
    }

    /// Reporting year, falling back to the year of the period end date.
    #[must_use]
    pub fn year(&self) -> Option<i64> {
        let reported = match &self.calendar_year {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        reported.or_else(|| self.parsed_date().map(|d| i64::from(d.year())))
    }

    /// Numeric line items.
    pub fn numeric_fields(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values
            .iter()
            .filter_map(|(name, value)| value.as_f64().map(|v| (name.as_str(), v)))
    }
}

/// One day of historical market capitalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCapPoint {
    /// Ticker symbol.
    pub symbol: String,
    /// Trading date.
    pub date: String,
    /// Market capitalization.
    pub market_cap: f64,
}

impl MarketCapPoint {
    /// Parse the date string into a NaiveDate.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_day(&self.date)
    }
}

/// All statements and market-cap history for one symbol.
#[derive(Debug, Clone, Default)]
pub struct FundamentalData {
    /// Ticker symbol.
    pub symbol: String,
    /// Income statements, most recent first.
    pub income_statements: Vec<StatementRecord>,
    /// Balance sheets, most recent first.
    pub balance_sheets: Vec<StatementRecord>,
    /// Cash flow statements, most recent first.
    pub cash_flows: Vec<StatementRecord>,
    /// Daily market capitalization.
    pub market_caps: Vec<MarketCapPoint>,
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}
