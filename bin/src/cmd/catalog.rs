//! Feature catalog listing.

use anyhow::Result;
use mktcap_features::{
    FeatureFamily,
    catalog::{MACRO_SERIES, features_by_family},
};

const FAMILIES: [FeatureFamily; 6] = [
    FeatureFamily::BalanceSheet,
    FeatureFamily::IncomeStatement,
    FeatureFamily::CashFlow,
    FeatureFamily::Composite,
    FeatureFamily::Absolute,
    FeatureFamily::Macro,
];

/// List the default features, optionally filtered by family.
pub(crate) fn list_features(family: Option<String>, verbose: bool) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Available Features                        ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    for fam in FAMILIES {
        let name = fam.to_string();
        if let Some(ref filter) = family
            && !name.to_lowercase().contains(&filter.to_lowercase())
        {
            continue;
        }

        let features = features_by_family(fam);
        println!("{} ({}):", name, fam.description());
        println!("{}", "-".repeat(60));

        for info in features {
            if !verbose {
                println!("  {}", info.name);
            } else if fam == FeatureFamily::Macro {
                let series = MACRO_SERIES.iter().find(|s| s.column == info.name);
                match series {
                    Some(s) => println!("  {:32} FRED {:12} {}", info.name, s.series_id, s.description),
                    None => println!("  {}", info.name),
                }
            } else {
                println!("  {:32} <- {}", info.name, info.inputs.join(", "));
            }
        }
        println!();
    }

    if !verbose {
        println!("Use --verbose for feature inputs.\n");
    }
    println!("Every feature also has <name>YoY and <name>Trend columns.");
    println!();

    Ok(())
}
