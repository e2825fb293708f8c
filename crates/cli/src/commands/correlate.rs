//! Correlate command.
//!
//! Runs the three canonical correlations on every merged table and gates them
//! for the number of tickers under test.

use anyhow::{Context, Result};
use clap::Args;
use mention_lag_analysis::{run_all_correlations, BonferroniGate};

use super::output::OutputFormat;
use super::{load_config, load_merged};

/// Arguments for the correlate command.
#[derive(Args, Debug, Clone)]
pub struct CorrelateArgs {
    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// Runs the correlate command.
pub fn run_correlate(config_path: &str, args: CorrelateArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let config = load_config(config_path)?;
    let gate = BonferroniGate::from_config(&config).context("Invalid significance settings")?;

    let universe = load_merged(&config)?;
    let report = run_all_correlations(&universe, &gate);

    match format {
        OutputFormat::Text => println!("{}", report.to_text()),
        OutputFormat::Json => println!(
            "{}",
            report.to_json().context("Failed to serialize report")?
        ),
    }

    Ok(())
}
