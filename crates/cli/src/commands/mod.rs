//! CLI commands for the mention lead/lag workspace.

pub mod correlate;
pub mod lead_lag;
pub mod merge;
pub mod output;

pub use correlate::{run_correlate, CorrelateArgs};
pub use lead_lag::{run_lead_lag, LeadLagArgs};
pub use merge::{run_merge, MergeArgs};

use anyhow::{Context, Result};
use mention_lag_core::{AnalysisConfig, ConfigLoader, TickerSeries};
use mention_lag_data::MergedTableStore;
use tracing::info;

pub(crate) fn load_config(path: &str) -> Result<AnalysisConfig> {
    let config = ConfigLoader::load(path)
        .with_context(|| format!("Failed to load configuration from {path}"))?;
    info!(
        tickers = config.tickers.len(),
        start = %config.start_date,
        end = %config.end_date,
        "loaded configuration"
    );
    Ok(config)
}

/// Loads the merged tables of every configured ticker, in configured order.
pub(crate) fn load_merged(config: &AnalysisConfig) -> Result<Vec<TickerSeries>> {
    let store = MergedTableStore::new(&config.paths.merged_dir);
    let universe = store.load_universe(config).with_context(|| {
        format!(
            "Failed to load merged tables from {}",
            config.paths.merged_dir.display()
        )
    })?;

    if universe.is_empty() {
        anyhow::bail!(
            "No merged tables found in {}. Run `mention-lag merge` first.",
            config.paths.merged_dir.display()
        );
    }

    Ok(universe)
}
