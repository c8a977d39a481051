//! File helpers for the mktcap CLI.

use chrono::NaiveDate;
use mktcap_traits::MktcapError;
use polars::prelude::*;
use std::{fs::File, path::Path};

/// Rows scanned when inferring CSV column types.
const SCHEMA_INFERENCE_ROWS: usize = 10_000;

/// Read a CSV file with a header row into a DataFrame.
///
/// Dates are left as strings; the library parses `YYYY-MM-DD` prefixes
/// where it needs them.
pub(crate) fn read_csv(path: &Path) -> Result<DataFrame, MktcapError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(SCHEMA_INFERENCE_ROWS))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Write a DataFrame to `path` as CSV with a header row.
pub(crate) fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), MktcapError> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate, MktcapError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|e| MktcapError::InvalidData(format!("Invalid date format: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_parse_date_invalid() {
        let result = parse_date("invalid");
        assert!(result.is_err());
    }

    #[test]
    fn test_csv_round_trip() {
        let path = std::env::temp_dir().join(format!("mktcap-cli-{}.csv", std::process::id()));
        let mut df = df! {
            "symbol" => &["AAPL", "MSFT"],
            "fillingDate" => &["2023-11-03", "2023-07-27"],
            "revenue" => &[383.3, 211.9],
        }
        .unwrap();

        write_csv(&mut df, &path).unwrap();
        let read = read_csv(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(read.shape(), (2, 3));
        assert_eq!(read.column("fillingDate").unwrap().dtype(), &DataType::String);
    }
}
