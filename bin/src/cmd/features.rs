//! Feature generation command implementation.

use crate::data;
use anyhow::Result;
use mktcap_features::{FeatureConfig, FeaturePipeline, ValueOverrides};
use mktcap_traits::StatementFrame;
use std::{fs, path::Path};
use tracing::info;

/// Run the feature pipeline over a statements CSV.
pub(crate) fn build_features(
    input: &Path,
    output: &Path,
    config: Option<&Path>,
    overrides: Option<&Path>,
    report: Option<&Path>,
) -> Result<()> {
    let config = match config {
        Some(path) => FeatureConfig::load(path)?,
        None => FeatureConfig::default(),
    };

    let mut pipeline = FeaturePipeline::new(config);
    if let Some(path) = overrides {
        let overrides = ValueOverrides::from_frame(&data::read_csv(path)?)?;
        info!(overrides = overrides.len(), "loaded value overrides");
        pipeline = pipeline.with_overrides(overrides);
    }

    let statements = StatementFrame::new(data::read_csv(input)?);
    info!(rows = statements.len(), "loaded statements");

    let out = pipeline.run(&statements)?;
    let summary = &out.report;

    let mut frame = out.table.data().clone();
    data::write_csv(&mut frame, output)?;

    if let Some(path) = report {
        fs::write(path, serde_json::to_string_pretty(summary)?)?;
    }

    println!("Rows:             {}", summary.rows);
    println!("Entities:         {}", summary.entities);
    println!("Features:         {}", summary.features);
    println!("Duplicate keys:   {}", summary.duplicate_keys);
    println!("Overrides:        {}", summary.overrides_applied);
    println!("Non-finite -> 0:  {}", summary.non_finite_replaced);
    println!("Nulls -> 0:       {}", summary.nulls_filled);
    if !summary.missing_columns.is_empty() {
        println!("Missing columns:  {}", summary.missing_columns.join(", "));
    }
    println!("Output:           {}", output.display());

    Ok(())
}
