//! Merge command.
//!
//! Aligns raw forum activity and cached market data on the configured calendar
//! and writes one merged table per ticker.

use anyhow::{bail, Result};
use clap::Args;
use mention_lag_analysis::{merge_universe, MergeOutcome};
use mention_lag_core::AnalysisConfig;
use mention_lag_data::{CsvForumStore, CsvMarketStore, MergedTableStore};
use tracing::error;

use super::load_config;

/// Arguments for the merge command.
#[derive(Args, Debug, Clone, Default)]
pub struct MergeArgs {
    /// Comma-separated subset of configured tickers to merge (default: all)
    #[arg(long)]
    pub tickers: Option<String>,
}

/// Counts printed after a merge run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub merged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl MergeSummary {
    fn from_outcome(outcome: &MergeOutcome) -> Self {
        Self {
            merged: outcome.merged.len(),
            skipped: outcome.skipped.len(),
            failed: outcome.failures.len(),
        }
    }

    pub fn to_text(&self) -> String {
        format!(
            "Merged: {}  Skipped (no forum data): {}  Failed: {}",
            self.merged, self.skipped, self.failed
        )
    }
}

fn select_tickers(config: AnalysisConfig, filter: Option<&str>) -> Result<AnalysisConfig> {
    let Some(filter) = filter else {
        return Ok(config);
    };

    let wanted: Vec<String> = filter
        .split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect();

    if let Some(unknown) = wanted
        .iter()
        .find(|t| !config.tickers.iter().any(|c| c.eq_ignore_ascii_case(t)))
    {
        bail!("Ticker {unknown} is not in the configured universe");
    }

    let tickers = config
        .tickers
        .iter()
        .filter(|c| wanted.iter().any(|t| c.eq_ignore_ascii_case(t)))
        .cloned()
        .collect();

    Ok(AnalysisConfig { tickers, ..config })
}

/// Merges every selected ticker and persists the merged tables.
///
/// A table that cannot be written counts as a failed ticker; the others are
/// still written. Fails only if no ticker was merged and written.
pub async fn merge_and_persist(config: &AnalysisConfig) -> Result<MergeSummary> {
    let forum = CsvForumStore::new(&config.paths.raw_forum_dir);
    let market = CsvMarketStore::new(&config.paths.raw_market_dir);
    let store = MergedTableStore::new(&config.paths.merged_dir);

    let outcome = merge_universe(config, &forum, &market).await;

    let mut summary = MergeSummary::from_outcome(&outcome);

    for series in &outcome.merged {
        if let Err(err) = store.save(series) {
            error!(ticker = series.ticker(), error = %err, "failed to write merged table");
            summary.merged -= 1;
            summary.failed += 1;
        }
    }

    if summary.merged == 0 {
        bail!("No ticker merged successfully ({})", summary.to_text());
    }

    Ok(summary)
}

/// Runs the merge command.
pub async fn run_merge(config_path: &str, args: MergeArgs) -> Result<()> {
    let config = select_tickers(load_config(config_path)?, args.tickers.as_deref())?;
    let summary = merge_and_persist(&config).await?;
    println!("{}", summary.to_text());
    Ok(())
}
