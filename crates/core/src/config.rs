use std::collections::HashSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Immutable analysis configuration threaded through every component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Ticker universe under simultaneous test, in reporting order
    pub tickers: Vec<String>,
    /// First calendar day of the analysis window (inclusive)
    pub start_date: NaiveDate,
    /// Last calendar day of the analysis window (inclusive)
    pub end_date: NaiveDate,
    /// Family-wise significance level before Bonferroni correction
    pub alpha: f64,
    pub paths: DataPaths,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPaths {
    pub raw_forum_dir: PathBuf,
    pub raw_market_dir: PathBuf,
    pub merged_dir: PathBuf,
}

impl AnalysisConfig {
    /// Number of simultaneous tests used for the Bonferroni correction.
    #[must_use]
    pub fn num_comparisons(&self) -> usize {
        self.tickers.len()
    }

    /// Per-test significance threshold: `alpha / num_comparisons`.
    #[must_use]
    pub fn bonferroni_threshold(&self) -> f64 {
        self.alpha / self.num_comparisons().max(1) as f64
    }

    /// Checks the invariants every component relies on.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` if the ticker universe is empty or
    /// has duplicates, the window is inverted, or alpha is outside (0, 1).
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.tickers.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "ticker universe is empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for ticker in &self.tickers {
            if ticker.trim().is_empty() {
                return Err(AnalysisError::InvalidConfig(
                    "ticker symbols must not be blank".to_string(),
                ));
            }
            if !seen.insert(ticker.to_uppercase()) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "duplicate ticker in universe: {ticker}"
                )));
            }
        }

        if self.start_date > self.end_date {
            return Err(AnalysisError::InvalidConfig(format!(
                "start_date {} is after end_date {}",
                self.start_date, self.end_date
            )));
        }

        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "alpha must lie in (0, 1), got {}",
                self.alpha
            )));
        }

        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tickers: ["NVDA", "TSLA", "SPY", "PLTR", "SMCI", "RDDT"]
                .iter()
                .map(|t| (*t).to_string())
                .collect(),
            start_date: NaiveDate::from_ymd_opt(2018, 8, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2025, 2, 21).unwrap_or_default(),
            alpha: 0.05,
            paths: DataPaths::default(),
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            raw_forum_dir: PathBuf::from("data/raw_wsb"),
            raw_market_dir: PathBuf::from("data/raw_yfinance"),
            merged_dir: PathBuf::from("data/merged"),
        }
    }
}
