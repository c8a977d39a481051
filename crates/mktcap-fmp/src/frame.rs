//! Assembling statement frames from FMP responses.

use crate::{
    Result,
    types::{FundamentalData, MarketCapPoint, StatementRecord},
};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Key and metadata columns written before the line items.
pub const HEADER_COLUMNS: &[&str] = &[
    "symbol",
    "date",
    "period",
    "calendarYear",
    "fillingDate",
    "target",
];

#[derive(Debug)]
struct MergedRow<'a> {
    header: &'a StatementRecord,
    target: Option<f64>,
    values: BTreeMap<&'a str, f64>,
}

/// Merges each symbol's statements on period end date and attaches the
/// regression target.
///
/// Only dates present in all three statements are kept. When a line item
/// appears in several statements (`netIncome`), the income statement wins,
/// then the balance sheet. `target` is the first market cap on or after the
/// filing date; it is null when no such quote exists.
///
/// Rows come out grouped by symbol in input order, ascending by date within
/// a symbol. [`HEADER_COLUMNS`] come first, then the union of all line
/// items in name order; a line item a symbol does not report is null.
///
/// # Errors
///
/// Returns an error if the DataFrame cannot be built.
pub fn statements_frame(data: &[FundamentalData]) -> Result<DataFrame> {
    let rows: Vec<MergedRow<'_>> = data.iter().flat_map(merge_symbol).collect();

    let line_items: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.values.keys().copied())
        .filter(|name| !HEADER_COLUMNS.contains(name))
        .collect();

    let mut columns: Vec<Column> = vec![
        Column::new(
            "symbol".into(),
            rows.iter().map(|r| r.header.symbol.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "date".into(),
            rows.iter().map(|r| r.header.date.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "period".into(),
            rows.iter().map(|r| r.header.period.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "calendarYear".into(),
            rows.iter().map(|r| r.header.year()).collect::<Vec<_>>(),
        ),
        Column::new(
            "fillingDate".into(),
            rows.iter()
                .map(|r| r.header.filling_date.clone())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "target".into(),
            rows.iter().map(|r| r.target).collect::<Vec<_>>(),
        ),
    ];

    for name in line_items {
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.values.get(name).copied()).collect();
        columns.push(Column::new(name.into(), values));
    }

    Ok(DataFrame::new(columns)?)
}

fn merge_symbol(data: &FundamentalData) -> Vec<MergedRow<'_>> {
    let balance_sheets: BTreeMap<&str, &StatementRecord> = data
        .balance_sheets
        .iter()
        .map(|r| (r.date.as_str(), r))
        .collect();
    let cash_flows: BTreeMap<&str, &StatementRecord> = data
        .cash_flows
        .iter()
        .map(|r| (r.date.as_str(), r))
        .collect();
    let market_caps = sorted_market_caps(&data.market_caps);

    let mut rows: BTreeMap<&str, MergedRow<'_>> = BTreeMap::new();
    for income in &data.income_statements {
        let date = income.date.as_str();
        let (Some(balance), Some(cash)) = (balance_sheets.get(date), cash_flows.get(date)) else {
            continue;
        };
        let mut values = BTreeMap::new();
        for record in [income, *balance, *cash] {
            for (name, value) in record.numeric_fields() {
                values.entry(name).or_insert(value);
            }
        }
        let target = income
            .parsed_filing_date()
            .and_then(|filed| market_cap_on_or_after(&market_caps, filed));
        rows.insert(
            date,
            MergedRow {
                header: income,
                target,
                values,
            },
        );
    }

    let skipped = data.income_statements.len() - rows.len();
    if skipped > 0 {
        debug!(symbol = %data.symbol, skipped, "statement dates missing from some statements");
    }
    rows.into_values().collect()
}

fn sorted_market_caps(points: &[MarketCapPoint]) -> Vec<(NaiveDate, f64)> {
    let mut dated: Vec<(NaiveDate, f64)> = points
        .iter()
        .filter_map(|p| p.parsed_date().map(|d| (d, p.market_cap)))
        .collect();
    dated.sort_by_key(|(date, _)| *date);
    dated
}

/// First market cap dated on or after `filed`, from points sorted by date.
pub(crate) fn market_cap_on_or_after(points: &[(NaiveDate, f64)], filed: NaiveDate) -> Option<f64> {
    let index = points.partition_point(|(date, _)| *date < filed);
    points.get(index).map(|(_, cap)| *cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mktcap_traits::types::{f64_column, i64_column, str_column};

    fn record(json: &str) -> StatementRecord {
        serde_json::from_str(json).unwrap()
    }

    fn sample() -> FundamentalData {
        FundamentalData {
            symbol: "AAPL".to_string(),
            income_statements: vec![
                record(
                    r#"{"date":"2023-09-30","symbol":"AAPL","period":"FY","calendarYear":"2023",
                        "fillingDate":"2023-11-03","revenue":383.0,"netIncome":97.0}"#,
                ),
                record(
                    r#"{"date":"2022-09-24","symbol":"AAPL","period":"FY","calendarYear":"2022",
                        "fillingDate":"2022-10-28","revenue":394.0,"netIncome":99.8}"#,
                ),
            ],
            balance_sheets: vec![
                record(r#"{"date":"2023-09-30","symbol":"AAPL","totalAssets":352.6}"#),
                record(r#"{"date":"2022-09-24","symbol":"AAPL","totalAssets":352.8}"#),
            ],
            cash_flows: vec![
                record(r#"{"date":"2023-09-30","symbol":"AAPL","netIncome":1.0,"freeCashFlow":99.6}"#),
            ],
            market_caps: vec![
                MarketCapPoint {
                    symbol: "AAPL".to_string(),
                    date: "2023-11-06".to_string(),
                    market_cap: 2800.0,
                },
                MarketCapPoint {
                    symbol: "AAPL".to_string(),
                    date: "2023-11-02".to_string(),
                    market_cap: 2700.0,
                },
            ],
        }
    }

    #[test]
    fn test_statements_frame() {
        let df = statements_frame(&[sample()]).unwrap();
        assert_eq!(df.height(), 1);

        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(&names[..6], HEADER_COLUMNS);
        assert_eq!(&names[6..], &["freeCashFlow", "netIncome", "revenue", "totalAssets"]);

        assert_eq!(str_column(&df, "period").unwrap()[0].as_deref(), Some("FY"));
        assert_eq!(i64_column(&df, "calendarYear").unwrap()[0], Some(2023));
        // Income statement value wins over the cash-flow duplicate.
        assert_eq!(f64_column(&df, "netIncome").unwrap()[0], Some(97.0));
        // Filed 2023-11-03: the 2023-11-02 quote is too early.
        assert_eq!(f64_column(&df, "target").unwrap()[0], Some(2800.0));
    }

    #[test]
    fn test_line_items_union_across_symbols() {
        let other = FundamentalData {
            symbol: "MSFT".to_string(),
            income_statements: vec![record(
                r#"{"date":"2023-06-30","symbol":"MSFT","calendarYear":2023,"ebitda":105.0}"#,
            )],
            balance_sheets: vec![record(r#"{"date":"2023-06-30","symbol":"MSFT"}"#)],
            cash_flows: vec![record(r#"{"date":"2023-06-30","symbol":"MSFT"}"#)],
            market_caps: Vec::new(),
        };

        let df = statements_frame(&[sample(), other]).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(f64_column(&df, "ebitda").unwrap(), vec![None, Some(105.0)]);
        assert_eq!(f64_column(&df, "revenue").unwrap(), vec![Some(383.0), None]);
        assert_eq!(f64_column(&df, "target").unwrap()[1], None);
    }

    #[test]
    fn test_market_cap_on_or_after() {
        let day = |d: u32| NaiveDate::from_ymd_opt(2023, 11, d).unwrap();
        let points = vec![(day(2), 1.0), (day(6), 2.0)];
        assert_eq!(market_cap_on_or_after(&points, day(2)), Some(1.0));
        assert_eq!(market_cap_on_or_after(&points, day(3)), Some(2.0));
        assert_eq!(market_cap_on_or_after(&points, day(7)), None);
    }

    #[test]
    fn test_empty_data() {
        let df = statements_frame(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), HEADER_COLUMNS.len());
    }
}
