//! Column profiling command implementation.

use crate::data;
use anyhow::Result;
use mktcap_features::{describe, duplicate_keys};
use std::path::Path;

/// Print summary statistics and duplicate keys for a CSV.
pub(crate) fn profile(input: &Path, keys: &[String], output: Option<&Path>) -> Result<()> {
    let df = data::read_csv(input)?;
    println!("Loaded {} rows, {} columns", df.height(), df.width());

    let mut summary = describe(&df)?;
    match output {
        Some(path) => {
            data::write_csv(&mut summary, path)?;
            println!("Wrote profile of {} columns to {}", summary.height(), path.display());
        }
        None => println!("{summary}"),
    }

    if !keys.is_empty() {
        let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let duplicates = duplicate_keys(&df, &key_refs)?;
        if duplicates.height() == 0 {
            println!("No duplicate ({}) keys", keys.join(", "));
        } else {
            println!("Duplicate ({}) keys:", keys.join(", "));
            println!("{duplicates}");
        }
    }

    Ok(())
}
