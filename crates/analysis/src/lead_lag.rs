//! Lead/lag analyzer.
//!
//! Correlates sentiment with price change under each of the seven shifts and
//! reduces the profile to a single indicator: the mean lead correlation minus
//! the mean lag correlation. A positive indicator means sentiment tends to move
//! before price; a negative one means it tends to follow.

use mention_lag_core::{AnalysisError, ShiftLabel, ShiftedTickerSeries};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::correlation::{correlate, Column};
use crate::transform::LeadLagData;

/// Fewest paired observations a single shift needs before it is correlated.
///
/// Below this the shift records a correlation of 0 instead of failing.
pub const LEAD_LAG_MIN_OBSERVATIONS: usize = 3;

/// Sentiment/price-change correlation under one shift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShiftCorrelation {
    pub shift: ShiftLabel,
    pub correlation: f64,
    /// `None` when the low-sample sentinel was used.
    pub p_value: Option<f64>,
    pub sample_size: usize,
    pub low_confidence: bool,
}

impl ShiftCorrelation {
    /// Correlates sentiment with price change over one shifted series.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::DegenerateVariance` if either column is constant
    /// over enough rows to correlate.
    pub fn compute(series: &ShiftedTickerSeries, shift: ShiftLabel) -> Result<Self, AnalysisError> {
        let sample_size = series
            .records()
            .iter()
            .filter(|record| {
                Column::SentimentScore.value(record).is_some()
                    && Column::PctChangeClose.value(record).is_some()
            })
            .count();

        if sample_size < LEAD_LAG_MIN_OBSERVATIONS {
            debug!(
                ticker = series.ticker(),
                %shift,
                sample_size,
                "too few observations, recording zero correlation"
            );
            return Ok(Self {
                shift,
                correlation: 0.0,
                p_value: None,
                sample_size,
                low_confidence: true,
            });
        }

        let result = correlate(
            series.records(),
            Column::SentimentScore,
            Column::PctChangeClose,
        )?;

        Ok(Self {
            shift,
            correlation: result.r,
            p_value: Some(result.p_value),
            sample_size,
            low_confidence: false,
        })
    }
}

/// Mean lead correlation minus mean lag correlation.
///
/// `correlations` is ordered as [`ShiftLabel::ALL`]; the zero shift is excluded
/// from both means.
#[must_use]
pub fn lead_lag_indicator(correlations: &[f64; 7]) -> f64 {
    let mean = |labels: [ShiftLabel; 3]| {
        labels
            .iter()
            .map(|label| correlations[label.index()])
            .sum::<f64>()
            / 3.0
    };

    mean(ShiftLabel::LEADS) - mean(ShiftLabel::LAGS)
}

/// Lead/lag result for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadLagSummary {
    pub ticker: String,
    /// One entry per shift, ordered as [`ShiftLabel::ALL`].
    pub profile: Vec<ShiftCorrelation>,
    pub indicator: f64,
    pub zero_lag_correlation: f64,
}

impl LeadLagSummary {
    /// Correlations ordered as [`ShiftLabel::ALL`].
    #[must_use]
    pub fn correlations(&self) -> [f64; 7] {
        let mut values = [0.0; 7];
        for entry in &self.profile {
            values[entry.shift.index()] = entry.correlation;
        }
        values
    }

    #[must_use]
    pub fn correlation(&self, shift: ShiftLabel) -> f64 {
        self.correlations()[shift.index()]
    }

    /// Shifts that fell back to the low-sample sentinel.
    pub fn low_confidence_shifts(&self) -> impl Iterator<Item = ShiftLabel> + '_ {
        self.profile
            .iter()
            .filter(|entry| entry.low_confidence)
            .map(|entry| entry.shift)
    }
}

/// Computes the seven-shift profile and indicator for one ticker.
///
/// # Errors
///
/// Returns `AnalysisError::UnknownTicker` if any shift lacks the ticker, or a
/// correlation error from [`ShiftCorrelation::compute`].
pub fn analyze_lead_lag(ticker: &str, data: &LeadLagData) -> Result<LeadLagSummary, AnalysisError> {
    let profile = ShiftLabel::ALL
        .iter()
        .map(|&shift| ShiftCorrelation::compute(data.get(shift, ticker)?, shift))
        .collect::<Result<Vec<_>, _>>()?;

    let mut correlations = [0.0; 7];
    for entry in &profile {
        correlations[entry.shift.index()] = entry.correlation;
    }

    Ok(LeadLagSummary {
        ticker: ticker.to_string(),
        indicator: lead_lag_indicator(&correlations),
        zero_lag_correlation: correlations[ShiftLabel::Zero.index()],
        profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::build_lead_lag_data;
    use chrono::NaiveDate;
    use mention_lag_core::{DailyRecord, TickerSeries};

    fn synthetic_returns(n: usize) -> Vec<f64> {
        let mut state: u64 = 42;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                ((state >> 33) as f64 / 2f64.powi(31) - 0.5) * 0.04
            })
            .collect()
    }

    /// Sentiment on day `t` equals the return of day `t + lead`, so a positive
    /// `lead` means sentiment moves first.
    fn leading_series(n: usize, lead: i64) -> TickerSeries {
        let returns = synthetic_returns(n);
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

        let mut close = 100.0;
        let records = start
            .iter_days()
            .take(n)
            .enumerate()
            .map(|(t, date)| {
                if t > 0 {
                    close *= 1.0 + returns[t];
                }
                let source = t as i64 + lead;
                let sentiment = if source >= 1 && source < n as i64 {
                    returns[source as usize] * 10.0
                } else {
                    0.0
                };
                DailyRecord {
                    date,
                    mention_count: t as u64 % 7,
                    mention_rank: 1,
                    sentiment_score: sentiment,
                    close: Some(close),
                    volume: Some(1_000.0),
                    pct_change_close: None,
                }
            })
            .collect();

        TickerSeries::new("SYN", records).unwrap().with_pct_change()
    }

    fn universe_of(series: TickerSeries) -> Vec<TickerSeries> {
        vec![series]
    }

    #[test]
    fn indicator_is_lead_mean_minus_lag_mean() {
        let correlations = [0.1, 0.2, 0.3, 0.9, 0.4, 0.5, 0.6];
        assert!((lead_lag_indicator(&correlations) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn indicator_ignores_zero_lag() {
        let a = [0.1, 0.2, 0.3, -1.0, 0.4, 0.5, 0.6];
        let b = [0.1, 0.2, 0.3, 1.0, 0.4, 0.5, 0.6];
        assert!((lead_lag_indicator(&a) - lead_lag_indicator(&b)).abs() < 1e-15);
    }

    #[test]
    fn sentiment_leading_price_gives_positive_indicator() {
        let data = build_lead_lag_data(&universe_of(leading_series(250, 2))).unwrap();
        let summary = analyze_lead_lag("SYN", &data).unwrap();

        assert!(summary.correlation(ShiftLabel::Lead2) > 0.999);
        assert!(summary.indicator > 0.25);
        assert_eq!(summary.profile.len(), 7);
        assert_eq!(summary.low_confidence_shifts().count(), 0);
    }

    #[test]
    fn sentiment_lagging_price_gives_negative_indicator() {
        let data = build_lead_lag_data(&universe_of(leading_series(250, -2))).unwrap();
        let summary = analyze_lead_lag("SYN", &data).unwrap();

        assert!(summary.correlation(ShiftLabel::Lag2) > 0.999);
        assert!(summary.indicator < -0.25);
    }

    #[test]
    fn zero_lag_correlation_is_reported_separately() {
        let data = build_lead_lag_data(&universe_of(leading_series(250, 0))).unwrap();
        let summary = analyze_lead_lag("SYN", &data).unwrap();

        assert!(summary.zero_lag_correlation > 0.999);
        assert!(summary.indicator.abs() < 0.2);
    }

    fn short_series() -> TickerSeries {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let closes = [100.0, 102.0, 101.0, 105.0, 104.0];
        let sentiment = [0.1, 0.5, -0.2, 0.3, 0.9];
        let records = start
            .iter_days()
            .zip(closes.iter().zip(sentiment))
            .enumerate()
            .map(|(i, (date, (close, s)))| DailyRecord {
                date,
                mention_count: i as u64 + 1,
                mention_rank: 1,
                sentiment_score: s,
                close: Some(*close),
                volume: Some(1_000.0 * (i as f64 + 1.0)),
                pct_change_close: None,
            })
            .collect();

        TickerSeries::new("TINY", records).unwrap().with_pct_change()
    }

    #[test]
    fn low_sample_shift_records_zero_instead_of_failing() {
        let data = build_lead_lag_data(&universe_of(short_series())).unwrap();
        let summary = analyze_lead_lag("TINY", &data).unwrap();

        assert_eq!(summary.correlation(ShiftLabel::Lead3), 0.0);
        let lead3 = summary.profile[ShiftLabel::Lead3.index()];
        assert!(lead3.low_confidence);
        assert_eq!(lead3.sample_size, 2);
        assert_eq!(lead3.p_value, None);

        let low: Vec<_> = summary.low_confidence_shifts().collect();
        assert_eq!(low, vec![ShiftLabel::Lag3, ShiftLabel::Lag2, ShiftLabel::Lead3]);
        assert!(!summary.profile[ShiftLabel::Zero.index()].low_confidence);
        assert_eq!(summary.profile[ShiftLabel::Zero.index()].sample_size, 4);
    }

    #[test]
    fn direct_correlation_on_same_rows_is_insufficient() {
        let data = build_lead_lag_data(&universe_of(short_series())).unwrap();
        let lead3 = data.get(ShiftLabel::Lead3, "TINY").unwrap();

        let err = correlate(
            lead3.records(),
            Column::SentimentScore,
            Column::PctChangeClose,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientSamples {
                required: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn unknown_ticker_is_an_error() {
        let data = build_lead_lag_data(&universe_of(short_series())).unwrap();
        assert!(matches!(
            analyze_lead_lag("NOPE", &data),
            Err(AnalysisError::UnknownTicker { .. })
        ));
    }
}
