//! Statement download command implementation.

use crate::data;
use anyhow::{Result, bail};
use mktcap_features::catalog::MACRO_SERIES;
use mktcap_fmp::{FmpClient, Period, statements_frame};
use mktcap_fred::{FredClient, attach_macro};
use std::path::Path;
use tracing::info;

/// Options for [`fetch_statements`].
#[derive(Debug)]
pub(crate) struct FetchOptions<'a> {
    pub(crate) symbols: &'a [String],
    pub(crate) period: Period,
    pub(crate) limit: Option<u32>,
    pub(crate) macro_start: Option<&'a str>,
    pub(crate) skip_macro: bool,
    pub(crate) output: &'a Path,
}

/// Download statements, join macro indicators by filing date and write a CSV.
pub(crate) async fn fetch_statements(options: FetchOptions<'_>) -> Result<()> {
    if options.symbols.is_empty() {
        bail!("no symbols given");
    }

    let fmp = FmpClient::from_env()?;
    let symbols: Vec<&str> = options.symbols.iter().map(String::as_str).collect();
    info!(symbols = symbols.len(), period = options.period.as_str(), "fetching statements");

    let fundamentals = fmp
        .bulk_fundamental_data(&symbols, options.period, options.limit)
        .await;
    if fundamentals.is_empty() {
        bail!("no statements fetched for {}", symbols.join(", "));
    }
    let mut frame = statements_frame(&fundamentals)?;

    if !options.skip_macro {
        let start = options.macro_start.map(data::parse_date).transpose()?;
        let fred = FredClient::from_env()?;
        let pairs: Vec<(&str, &str)> = MACRO_SERIES
            .iter()
            .map(|s| (s.column, s.series_id))
            .collect();
        let series = fred.fetch_all(&pairs, start).await;
        info!(
            fetched = series.len(),
            requested = pairs.len(),
            "fetched macro indicators"
        );
        frame = attach_macro(&frame, "fillingDate", &series)?;
    }

    data::write_csv(&mut frame, options.output)?;
    info!(
        rows = frame.height(),
        columns = frame.width(),
        path = %options.output.display(),
        "wrote statements"
    );
    println!(
        "Wrote {} rows for {} symbols to {}",
        frame.height(),
        fundamentals.len(),
        options.output.display()
    );

    Ok(())
}
