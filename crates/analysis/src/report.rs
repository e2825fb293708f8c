//! Batch reports over a universe of merged series.

use std::collections::BTreeMap;

use mention_lag_core::{AnalysisError, ShiftLabel, TickerSeries};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::correlation::{CorrelationPair, CorrelationResult};
use crate::lead_lag::{analyze_lead_lag, LeadLagSummary};
use crate::significance::{BonferroniGate, SignificanceFlags};
use crate::transform::{build_lead_lag_data, derive_universe_pct_change};

const RULE: &str = "════════════════════════════════════════════════════════════════════════\n";
const THIN_RULE: &str = "────────────────────────────────────────────────────────────────────────\n";

/// Canonical correlations of one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerCorrelations {
    pub ticker: String,
    pub mention_volume: CorrelationResult,
    pub mention_abs_price: CorrelationResult,
    pub sentiment_price: CorrelationResult,
    pub significant: SignificanceFlags,
}

impl TickerCorrelations {
    #[must_use]
    pub const fn get(&self, pair: CorrelationPair) -> &CorrelationResult {
        match pair {
            CorrelationPair::MentionVolume => &self.mention_volume,
            CorrelationPair::MentionAbsPriceChange => &self.mention_abs_price,
            CorrelationPair::SentimentPriceChange => &self.sentiment_price,
        }
    }
}

/// Canonical correlations for every ticker, gated for multiple comparisons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationReport {
    pub alpha: f64,
    pub comparisons: usize,
    pub threshold: f64,
    pub entries: Vec<TickerCorrelations>,
    pub failures: BTreeMap<String, AnalysisError>,
}

impl CorrelationReport {
    #[must_use]
    pub fn entry(&self, ticker: &str) -> Option<&TickerCorrelations> {
        self.entries.iter().find(|entry| entry.ticker == ticker)
    }

    /// Number of (ticker, pairing) results that pass the gate.
    #[must_use]
    pub fn significant_count(&self) -> usize {
        self.entries
            .iter()
            .flat_map(|entry| {
                CorrelationPair::ALL
                    .into_iter()
                    .filter(move |pair| entry.significant.get(*pair))
            })
            .count()
    }

    /// # Errors
    ///
    /// Returns a `serde_json` error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Renders the report as aligned plain text.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(RULE);
        output.push_str("  FORUM ACTIVITY vs MARKET CORRELATIONS\n");
        output.push_str(RULE);
        output.push_str(&format!(
            "  Bonferroni threshold: {:.6} (alpha {} / {} comparisons)\n",
            self.threshold, self.alpha, self.comparisons
        ));
        output.push_str(THIN_RULE);
        output.push_str(&format!(
            "  {:<8} {:<28} {:>8} {:>12} {:>6}  {}\n",
            "Ticker", "Pairing", "r", "p-value", "n", "Sig"
        ));
        output.push_str(THIN_RULE);

        for entry in &self.entries {
            for pair in CorrelationPair::ALL {
                let result = entry.get(pair);
                output.push_str(&format!(
                    "  {:<8} {:<28} {:>8.4} {:>12.6} {:>6}  {}\n",
                    entry.ticker,
                    pair.label(),
                    result.r,
                    result.p_value,
                    result.sample_size,
                    if entry.significant.get(pair) { "*" } else { "" }
                ));
            }
        }

        if !self.failures.is_empty() {
            output.push_str(THIN_RULE);
            output.push_str("  Failed:\n");
            for (ticker, err) in &self.failures {
                output.push_str(&format!("  {ticker:<8} {err}\n"));
            }
        }

        output.push_str(RULE);
        output.push_str(&format!(
            "  {} of {} results significant after correction\n",
            self.significant_count(),
            self.entries.len() * CorrelationPair::ALL.len()
        ));

        output
    }
}

fn correlate_ticker(
    series: &TickerSeries,
    gate: &BonferroniGate,
) -> Result<TickerCorrelations, AnalysisError> {
    let records = series.records();
    let mention_volume = CorrelationPair::MentionVolume.analyze(records)?;
    let mention_abs_price = CorrelationPair::MentionAbsPriceChange.analyze(records)?;
    let sentiment_price = CorrelationPair::SentimentPriceChange.analyze(records)?;

    let significant = gate.flag([
        mention_volume.p_value,
        mention_abs_price.p_value,
        sentiment_price.p_value,
    ]);

    Ok(TickerCorrelations {
        ticker: series.ticker().to_string(),
        mention_volume,
        mention_abs_price,
        sentiment_price,
        significant,
    })
}

/// Runs the three canonical correlations on every ticker.
///
/// Percent change is derived for series that lack it. A ticker whose
/// correlation fails is recorded in `failures`; the others still run.
/// Entries follow universe order.
#[must_use]
pub fn run_all_correlations(universe: &[TickerSeries], gate: &BonferroniGate) -> CorrelationReport {
    let derived = derive_universe_pct_change(universe.to_vec());

    let mut entries = Vec::with_capacity(derived.len());
    let mut failures = BTreeMap::new();

    for series in &derived {
        let ticker = series.ticker();
        match correlate_ticker(series, gate) {
            Ok(entry) => {
                info!(
                    ticker = %ticker,
                    mention_volume_r = entry.mention_volume.r,
                    mention_abs_price_r = entry.mention_abs_price.r,
                    sentiment_price_r = entry.sentiment_price.r,
                    "correlations computed"
                );
                entries.push(entry);
            }
            Err(err) => {
                error!(ticker = %ticker, error = %err, "correlation failed");
                failures.insert(ticker.to_string(), err);
            }
        }
    }

    CorrelationReport {
        alpha: gate.alpha(),
        comparisons: gate.comparisons(),
        threshold: gate.threshold(),
        entries,
        failures,
    }
}

/// Lead/lag profiles for every ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadLagReport {
    pub entries: Vec<LeadLagSummary>,
    pub failures: BTreeMap<String, AnalysisError>,
}

impl LeadLagReport {
    #[must_use]
    pub fn entry(&self, ticker: &str) -> Option<&LeadLagSummary> {
        self.entries.iter().find(|entry| entry.ticker == ticker)
    }

    /// # Errors
    ///
    /// Returns a `serde_json` error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Renders the report as aligned plain text.
    ///
    /// Low-confidence shifts are marked with `~`.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(RULE);
        output.push_str("  SENTIMENT LEAD/LAG vs PRICE CHANGE\n");
        output.push_str(RULE);

        output.push_str(&format!("  {:<8}", "Ticker"));
        for shift in ShiftLabel::ALL {
            output.push_str(&format!(" {:>7}", shift.as_str()));
        }
        output.push_str(&format!(" {:>10}\n", "Indicator"));
        output.push_str(THIN_RULE);

        for entry in &self.entries {
            output.push_str(&format!("  {:<8}", entry.ticker));
            for shift in &entry.profile {
                let marker = if shift.low_confidence { "~" } else { " " };
                output.push_str(&format!(" {:>6.3}{marker}", shift.correlation));
            }
            output.push_str(&format!(" {:>+10.4}\n", entry.indicator));
        }

        if !self.failures.is_empty() {
            output.push_str(THIN_RULE);
            output.push_str("  Failed:\n");
            for (ticker, err) in &self.failures {
                output.push_str(&format!("  {ticker:<8} {err}\n"));
            }
        }

        output.push_str(RULE);
        output.push_str("  Indicator = mean(lead_1..lead_3) - mean(lag_3..lag_1)\n");
        output.push_str("  Positive: sentiment moves before price. ~ = fewer than 3 observations.\n");

        output
    }
}

/// Runs the lead/lag analysis on every ticker.
///
/// Percent change is derived on the unshifted series before shifting.
///
/// # Errors
///
/// Returns an error only if the shifted views cannot be built; per-ticker
/// correlation failures are recorded in the report.
pub fn run_lead_lag(universe: &[TickerSeries]) -> Result<LeadLagReport, AnalysisError> {
    let derived = derive_universe_pct_change(universe.to_vec());
    let data = build_lead_lag_data(&derived)?;

    let mut entries = Vec::with_capacity(derived.len());
    let mut failures = BTreeMap::new();

    for ticker in data.tickers() {
        match analyze_lead_lag(ticker, &data) {
            Ok(summary) => {
                info!(
                    ticker = %ticker,
                    indicator = summary.indicator,
                    zero_lag = summary.zero_lag_correlation,
                    "lead/lag computed"
                );
                entries.push(summary);
            }
            Err(err) => {
                error!(ticker = %ticker, error = %err, "lead/lag failed");
                failures.insert(ticker.to_string(), err);
            }
        }
    }

    Ok(LeadLagReport { entries, failures })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mention_lag_core::DailyRecord;

    fn series(ticker: &str, closes: &[f64], mentions: &[u64], sentiment: &[f64]) -> TickerSeries {
        let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let records = start
            .iter_days()
            .zip(closes.iter().zip(mentions.iter().zip(sentiment)))
            .map(|(date, (close, (m, s)))| DailyRecord {
                date,
                mention_count: *m,
                mention_rank: 1,
                sentiment_score: *s,
                close: Some(*close),
                volume: Some(1_000.0 + *m as f64 * 50.0 + close * 3.0),
                pct_change_close: None,
            })
            .collect();
        TickerSeries::new(ticker, records).unwrap()
    }

    fn good(ticker: &str) -> TickerSeries {
        series(
            ticker,
            &[100.0, 103.0, 101.0, 104.0, 99.0, 100.0, 108.0],
            &[3, 9, 2, 7, 12, 1, 15],
            &[0.1, 0.4, -0.2, 0.3, -0.5, 0.0, 0.7],
        )
    }

    fn universe() -> Vec<TickerSeries> {
        vec![
            good("GOOD"),
            series(
                "FLAT",
                &[50.0, 51.0, 52.0, 51.0, 50.0, 49.0, 50.0],
                &[0, 0, 0, 0, 0, 0, 0],
                &[0.0; 7],
            ),
        ]
    }

    #[test]
    fn correlation_failures_do_not_stop_the_batch() {
        let gate = BonferroniGate::new(0.05, 2).unwrap();
        let report = run_all_correlations(&universe(), &gate);

        assert_eq!(report.entries.len(), 1);
        assert!(report.entry("GOOD").is_some());
        assert!(matches!(
            report.failures.get("FLAT"),
            Some(AnalysisError::DegenerateVariance { .. })
        ));
        assert!((report.threshold - 0.025).abs() < 1e-15);
    }

    #[test]
    fn correlation_report_renders_text_and_json() {
        let gate = BonferroniGate::new(0.05, 2).unwrap();
        let report = run_all_correlations(&universe(), &gate);

        let text = report.to_text();
        assert!(text.contains("GOOD"));
        assert!(text.contains("sentiment vs price change"));
        assert!(text.contains("Failed:"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["comparisons"], 2);
        assert_eq!(json["entries"][0]["ticker"], "GOOD");
        assert_eq!(json["failures"]["FLAT"]["kind"], "degenerate_variance");
    }

    #[test]
    fn lead_lag_report_covers_every_ticker() {
        let report = run_lead_lag(&universe()).unwrap();

        let good = report.entry("GOOD").unwrap();
        assert_eq!(good.profile.len(), 7);
        assert!(matches!(
            report.failures.get("FLAT"),
            Some(AnalysisError::DegenerateVariance { .. })
        ));

        let text = report.to_text();
        assert!(text.contains("lead_3"));
        assert!(text.contains("GOOD"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["entries"][0]["profile"][0]["shift"], "lag_3");
    }

    #[test]
    fn report_entries_follow_universe_order() {
        let universe = vec![good("TSLA"), good("AAPL"), good("NVDA")];
        let gate = BonferroniGate::new(0.05, 3).unwrap();

        let correlations = run_all_correlations(&universe, &gate);
        let order: Vec<&str> = correlations.entries.iter().map(|e| e.ticker.as_str()).collect();
        assert_eq!(order, vec!["TSLA", "AAPL", "NVDA"]);

        let lead_lag = run_lead_lag(&universe).unwrap();
        let order: Vec<&str> = lead_lag.entries.iter().map(|e| e.ticker.as_str()).collect();
        assert_eq!(order, vec!["TSLA", "AAPL", "NVDA"]);

        let text = correlations.to_text();
        let tsla = text.find("TSLA").unwrap();
        let aapl = text.find("AAPL").unwrap();
        assert!(tsla < aapl);
    }
}
