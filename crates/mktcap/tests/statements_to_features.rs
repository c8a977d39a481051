use approx::assert_relative_eq;
use mktcap::{
    FeatureConfig, FeaturePipeline, StatementFrame,
    features::{Winsorizer, catalog::DENOMINATOR_EPSILON},
    fred::{MacroObservations, attach_macro},
    traits::types::f64_column,
};
use polars::prelude::*;
use std::collections::BTreeMap;

fn day(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn statements() -> DataFrame {
    let raw = df! {
        "symbol" => &["A", "A"],
        "calendarYear" => &[2020i64, 2021],
        "fillingDate" => &["2020-10-30", "2021-10-29"],
        "target" => &[900.0, 1100.0],
        "totalAssets" => &[0.0, 100.0],
        "revenue" => &[40.0, 50.0],
        "cashAndCashEquivalents" => &[1.0, 10.0],
    }
    .unwrap();

    let unemployment = MacroObservations::new(
        "unemployment",
        vec![(day(2020, 1, 1), 3.6), (day(2021, 1, 1), 6.4)],
    );
    attach_macro(&raw, "fillingDate", &[unemployment]).unwrap()
}

fn config() -> FeatureConfig {
    FeatureConfig {
        macro_columns: vec!["unemployment".to_string()],
        ..Default::default()
    }
}

#[test]
fn zero_assets_divide_by_epsilon() {
    let output = FeaturePipeline::new(config())
        .run(&StatementFrame::new(statements()))
        .unwrap();
    let df = output.table.data();

    let cash = f64_column(df, "cashAndEquivalentsToAssets").unwrap();
    assert_relative_eq!(cash[0].unwrap(), 1.0 / DENOMINATOR_EPSILON, epsilon = 1e-9);
    assert_relative_eq!(cash[1].unwrap(), 10.0 / (100.0 + DENOMINATOR_EPSILON), epsilon = 1e-12);

    let assets = f64_column(df, "totalAssets").unwrap();
    assert_relative_eq!(assets[0].unwrap(), DENOMINATOR_EPSILON);
}

#[test]
fn macro_values_join_by_filing_date() {
    let output = FeaturePipeline::new(config())
        .run(&StatementFrame::new(statements()))
        .unwrap();
    let df = output.table.data();

    assert_eq!(
        f64_column(df, "unemployment").unwrap(),
        vec![Some(3.6), Some(6.4)]
    );
    let yoy = f64_column(df, "unemploymentYoY").unwrap();
    assert_eq!(yoy[0], Some(0.0));
    assert_relative_eq!(yoy[1].unwrap(), (6.4 - 3.6) / 3.6, epsilon = 1e-12);
}

#[test]
fn preset_bounds_clip_extreme_ratios() {
    let output = FeaturePipeline::new(config())
        .run(&StatementFrame::new(statements()))
        .unwrap();

    let bounds = BTreeMap::from([("cashAndEquivalentsToAssets".to_string(), (0.0, 1.0))]);
    let clipped = Winsorizer::with_clip_values(bounds)
        .transform(output.table.data())
        .unwrap();

    let cash = f64_column(&clipped, "cashAndEquivalentsToAssets").unwrap();
    assert_eq!(cash[0], Some(1.0));
    assert_relative_eq!(cash[1].unwrap(), 10.0 / (100.0 + DENOMINATOR_EPSILON), epsilon = 1e-12);
}
