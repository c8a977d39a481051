//! Period reference and inference command implementations.

use crate::data;
use anyhow::Result;
use mktcap_periods::{
    DAYS_IN_YEAR, PeriodInferer, PeriodReferenceBuilder, PeriodReferenceTable, add_date_parts,
    circular_distance,
};
use std::path::Path;
use tracing::info;

/// Build a per-entity period reference table from labelled filings.
pub(crate) fn build_reference(
    input: &Path,
    date_column: &str,
    entity_column: &str,
    label_column: &str,
    output: &Path,
) -> Result<()> {
    let filings = add_date_parts(&data::read_csv(input)?, date_column)?;
    let yday = format!("{date_column}_yday");

    let builder = PeriodReferenceBuilder::new(0.0, DAYS_IN_YEAR)?;
    let table = builder.build(&filings, &yday, &[entity_column, label_column])?;
    table.save(output)?;

    info!(entities = table.len(), path = %output.display(), "saved period reference table");
    println!(
        "Built reference days for {} entities from {} filings",
        table.len(),
        filings.height()
    );
    Ok(())
}

/// Label each filing with its nearest reference period.
pub(crate) fn infer_periods(
    input: &Path,
    table: &Path,
    date_column: &str,
    entity_column: &str,
    output_column: &str,
    output: &Path,
) -> Result<()> {
    let table = PeriodReferenceTable::load(table)?;
    let filings = add_date_parts(&data::read_csv(input)?, date_column)?;
    let yday = format!("{date_column}_yday");

    let mut labelled = PeriodInferer::for_table(&table).infer_column(
        &filings,
        entity_column,
        &yday,
        output_column,
    )?;
    let unresolved = labelled.column(output_column)?.null_count();
    data::write_csv(&mut labelled, output)?;

    println!(
        "Labelled {} of {} filings ({} unresolved)",
        labelled.height() - unresolved,
        labelled.height(),
        unresolved
    );
    Ok(())
}

/// Print the circular distance between two values.
pub(crate) fn distance(v1: f64, v2: f64, low: f64, high: f64) -> Result<()> {
    println!("{}", circular_distance(v1, v2, low, high)?);
    Ok(())
}
