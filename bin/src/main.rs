//! mktcap CLI binary.
//!
//! Provides command-line interface for mktcap feature generation.

mod cmd;
mod data;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use mktcap_fmp::Period;
use std::{path::PathBuf, process};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mktcap")]
#[command(about = "Market-capitalization features from financial statements", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PeriodArg {
    Annual,
    Quarter,
}

impl From<PeriodArg> for Period {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Annual => Self::Annual,
            PeriodArg::Quarter => Self::Quarter,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List available features
    Catalog {
        /// Filter by family
        #[arg(short, long)]
        family: Option<String>,

        /// Show feature inputs
        #[arg(short, long)]
        verbose: bool,
    },

    /// Download statements and macro indicators to a CSV
    Fetch {
        /// Ticker symbol(s)
        #[arg(short, long, value_delimiter = ',', required = true)]
        symbols: Vec<String>,

        /// Reporting period
        #[arg(short, long, value_enum, default_value = "annual")]
        period: PeriodArg,

        /// Maximum statements per symbol
        #[arg(short, long)]
        limit: Option<u32>,

        /// First macro observation date (YYYY-MM-DD)
        #[arg(long)]
        macro_start: Option<String>,

        /// Do not join FRED macro indicators
        #[arg(long)]
        skip_macro: bool,

        /// Output CSV path
        #[arg(short, long, default_value = "statements.csv")]
        output: PathBuf,
    },

    /// Build the feature table from a statements CSV
    Features {
        /// Statements CSV
        input: PathBuf,

        /// Output CSV path
        #[arg(short, long, default_value = "features.csv")]
        output: PathBuf,

        /// Pipeline configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Value overrides CSV with symbol, year, column and value columns
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// Write the build report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Reporting-period reference tables and inference
    Periods {
        #[command(subcommand)]
        command: PeriodsCommand,
    },

    /// Summary statistics and duplicate keys of a CSV
    Profile {
        /// Input CSV
        input: PathBuf,

        /// Key columns to check for duplicates
        #[arg(short, long, value_delimiter = ',', default_value = "symbol,calendarYear")]
        keys: Vec<String>,

        /// Write the profile as CSV instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum PeriodsCommand {
    /// Build a reference table of filing days from labelled filings
    Build {
        /// Filings CSV
        input: PathBuf,

        /// Filing date column
        #[arg(long, default_value = "fillingDate")]
        date_column: String,

        /// Entity column
        #[arg(long, default_value = "symbol")]
        entity: String,

        /// Period label column
        #[arg(long, default_value = "period")]
        label: String,

        /// Output JSON path
        #[arg(short, long, default_value = "periods.json")]
        output: PathBuf,
    },

    /// Label filings with their nearest reference period
    Infer {
        /// Filings CSV
        input: PathBuf,

        /// Reference table JSON
        #[arg(short, long)]
        table: PathBuf,

        /// Filing date column
        #[arg(long, default_value = "fillingDate")]
        date_column: String,

        /// Entity column
        #[arg(long, default_value = "symbol")]
        entity: String,

        /// Name of the inferred label column
        #[arg(long, default_value = "inferredPeriod")]
        output_column: String,

        /// Output CSV path
        #[arg(short, long, default_value = "inferred.csv")]
        output: PathBuf,
    },

    /// Circular distance between two values
    Distance {
        /// First value
        v1: f64,

        /// Second value
        v2: f64,

        /// Lower bound of the cycle
        #[arg(long, default_value = "0")]
        low: f64,

        /// Upper bound of the cycle
        #[arg(long, default_value = "365")]
        high: f64,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Catalog { family, verbose } => {
            cmd::catalog::list_features(family, verbose)?;
        }
        Commands::Fetch {
            symbols,
            period,
            limit,
            macro_start,
            skip_macro,
            output,
        } => {
            cmd::fetch::fetch_statements(cmd::fetch::FetchOptions {
                symbols: &symbols,
                period: period.into(),
                limit,
                macro_start: macro_start.as_deref(),
                skip_macro,
                output: &output,
            })
            .await?;
        }
        Commands::Features {
            input,
            output,
            config,
            overrides,
            report,
        } => {
            cmd::features::build_features(
                &input,
                &output,
                config.as_deref(),
                overrides.as_deref(),
                report.as_deref(),
            )?;
        }
        Commands::Periods { command } => match command {
            PeriodsCommand::Build {
                input,
                date_column,
                entity,
                label,
                output,
            } => {
                cmd::periods::build_reference(&input, &date_column, &entity, &label, &output)?;
            }
            PeriodsCommand::Infer {
                input,
                table,
                date_column,
                entity,
                output_column,
                output,
            } => {
                cmd::periods::infer_periods(
                    &input,
                    &table,
                    &date_column,
                    &entity,
                    &output_column,
                    &output,
                )?;
            }
            PeriodsCommand::Distance { v1, v2, low, high } => {
                cmd::periods::distance(v1, v2, low, high)?;
            }
        },
        Commands::Profile {
            input,
            keys,
            output,
        } => {
            cmd::profile::profile(&input, &keys, output.as_deref())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_features() {
        let cli = Cli::try_parse_from(["mktcap", "features", "in.csv", "--config", "cfg.json"])
            .unwrap();
        match cli.command {
            Commands::Features { input, config, output, .. } => {
                assert_eq!(input, PathBuf::from("in.csv"));
                assert_eq!(config, Some(PathBuf::from("cfg.json")));
                assert_eq!(output, PathBuf::from("features.csv"));
            }
            _ => panic!("expected features command"),
        }
    }

    #[test]
    fn test_parse_fetch_period() {
        let cli = Cli::try_parse_from(["mktcap", "fetch", "-s", "AAPL,MSFT", "-p", "quarter"])
            .unwrap();
        match cli.command {
            Commands::Fetch { symbols, period, .. } => {
                assert_eq!(symbols, vec!["AAPL", "MSFT"]);
                assert_eq!(Period::from(period), Period::Quarter);
            }
            _ => panic!("expected fetch command"),
        }
    }
}
