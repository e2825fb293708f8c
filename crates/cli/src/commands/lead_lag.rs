//! Lead-lag command.

use anyhow::{Context, Result};
use clap::Args;
use mention_lag_analysis::run_lead_lag as analyze_universe;

use super::output::OutputFormat;
use super::{load_config, load_merged};

/// Arguments for the lead-lag command.
#[derive(Args, Debug, Clone)]
pub struct LeadLagArgs {
    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// Runs the lead-lag command.
pub fn run_lead_lag(config_path: &str, args: LeadLagArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let config = load_config(config_path)?;

    let universe = load_merged(&config)?;
    let report = analyze_universe(&universe).context("Failed to build shifted series")?;

    match format {
        OutputFormat::Text => println!("{}", report.to_text()),
        OutputFormat::Json => println!(
            "{}",
            report.to_json().context("Failed to serialize report")?
        ),
    }

    Ok(())
}
