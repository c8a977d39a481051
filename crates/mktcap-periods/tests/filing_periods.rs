//! Building a reference table from filing dates and labelling new filings.

use approx::assert_abs_diff_eq;
use mktcap_periods::{
    CircularScale, DAYS_IN_YEAR, PeriodInferer, PeriodReferenceBuilder, PeriodReferenceTable,
    ReferenceTableHandle, add_date_parts,
};
use mktcap_traits::types::str_column;
use polars::prelude::*;
use std::collections::BTreeMap;

fn labelled_filings() -> DataFrame {
    df! {
        "symbol" => &["AAPL", "AAPL", "AAPL", "AAPL", "AAPL", "XYZ", "XYZ", "XYZ"],
        "period" => &["FY", "FY", "FY", "Q1", "Q1", "FY", "FY", "Q2"],
        "fillingDate" => &[
            "2021-10-29", "2022-10-28", "2023-11-03",
            "2022-01-28", "2023-02-03",
            "2021-12-30", "2023-01-02", "2022-07-01",
        ],
    }
    .unwrap()
}

fn reference_table() -> PeriodReferenceTable {
    let filings = add_date_parts(&labelled_filings(), "fillingDate").unwrap();
    PeriodReferenceBuilder::new(0.0, DAYS_IN_YEAR)
        .unwrap()
        .build(&filings, "fillingDate_yday", &["symbol", "period"])
        .unwrap()
}

#[test]
fn year_end_filings_average_across_the_wrap() {
    let table = reference_table();

    assert_eq!(table.len(), 2);
    assert_abs_diff_eq!(table.reference("XYZ", "FY").unwrap(), 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(table.reference("XYZ", "Q2").unwrap(), 182.0, epsilon = 1e-6);
    assert_abs_diff_eq!(table.reference("AAPL", "Q1").unwrap(), 31.0, epsilon = 1e-3);
}

#[test]
fn new_filings_take_the_nearest_label() {
    let table = reference_table();
    let new_filings = add_date_parts(
        &df! {
            "symbol" => &[Some("AAPL"), Some("AAPL"), Some("XYZ"), Some("ZZZ"), None],
            "fillingDate" => &[
                Some("2024-11-01"),
                Some("2024-02-02"),
                Some("2024-12-31"),
                Some("2024-05-01"),
                Some("2024-05-01"),
            ],
        }
        .unwrap(),
        "fillingDate",
    )
    .unwrap();

    let labelled = PeriodInferer::for_table(&table)
        .infer_column(&new_filings, "symbol", "fillingDate_yday", "inferredPeriod")
        .unwrap();

    assert_eq!(
        str_column(&labelled, "inferredPeriod").unwrap(),
        vec![
            Some("FY".to_string()),
            Some("Q1".to_string()),
            Some("FY".to_string()),
            None,
            None,
        ]
    );
}

#[test]
fn saved_table_labels_like_the_original() {
    let table = reference_table();
    let restored = PeriodReferenceTable::from_json(&table.to_json().unwrap()).unwrap();

    let original = PeriodInferer::for_table(&table);
    let reloaded = PeriodInferer::for_table(&restored);
    for day in [1.0, 90.0, 182.0, 300.0, 364.0] {
        assert_eq!(original.infer("XYZ", day), reloaded.infer("XYZ", day));
        assert_eq!(original.infer("AAPL", day), reloaded.infer("AAPL", day));
    }
}

#[test]
fn published_table_replaces_snapshot_for_new_readers() {
    let handle = ReferenceTableHandle::new(PeriodReferenceTable::from_entries(
        CircularScale::days_of_year(),
        BTreeMap::new(),
    ));
    let before = handle.snapshot();
    assert!(before.is_empty());

    handle.publish(reference_table());

    assert!(before.is_empty());
    assert_eq!(
        PeriodInferer::for_table(&handle.snapshot()).infer("AAPL", 305.0),
        Some("FY".to_string())
    );
}
