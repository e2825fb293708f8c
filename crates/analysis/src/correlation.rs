//! Correlation engine.
//!
//! Pearson correlation between two columns of a daily series, with a two-tailed
//! p-value from Student's t distribution. Rows are deleted pairwise: a row only
//! contributes if both selected values are present.

use mention_lag_core::{AnalysisError, DailyRecord};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Fewest paired observations a general correlation accepts.
///
/// Two points always fit a line exactly, so they are rejected rather than
/// reported as a perfect correlation.
pub const MIN_PAIRED_OBSERVATIONS: usize = 3;

/// Result of a Pearson correlation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Pearson correlation coefficient [-1, 1]
    pub r: f64,
    /// Two-tailed p-value under the null r = 0
    pub p_value: f64,
    /// Number of paired observations used
    pub sample_size: usize,
}

/// A numeric field of a [`DailyRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    MentionCount,
    MentionRank,
    SentimentScore,
    Close,
    Volume,
    PctChangeClose,
    AbsPctChangeClose,
}

impl Column {
    /// Reads the column from a record; `None` if the value is absent.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value(self, record: &DailyRecord) -> Option<f64> {
        match self {
            Self::MentionCount => Some(record.mention_count as f64),
            Self::MentionRank => Some(f64::from(record.mention_rank)),
            Self::SentimentScore => Some(record.sentiment_score),
            Self::Close => record.close,
            Self::Volume => record.volume,
            Self::PctChangeClose => record.pct_change_close,
            Self::AbsPctChangeClose => record.pct_change_close.map(f64::abs),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MentionCount => "Mention_Count",
            Self::MentionRank => "Mention_Rank",
            Self::SentimentScore => "Sentiment_Score",
            Self::Close => "Close",
            Self::Volume => "Volume",
            Self::PctChangeClose => "Pct_Change_Close",
            Self::AbsPctChangeClose => "Abs_Pct_Change_Close",
        }
    }
}

/// Calculates the Pearson correlation between two aligned slices.
///
/// # Errors
///
/// - `LengthMismatch` if the slices differ in length
/// - `InsufficientSamples` if fewer than [`MIN_PAIRED_OBSERVATIONS`] pairs are given
/// - `NonFiniteValue` if either slice holds NaN or an infinity (named `x` or `y`)
/// - `DegenerateVariance` if either slice is constant (named `x` or `y`)
pub fn pearson(x: &[f64], y: &[f64]) -> Result<CorrelationResult, AnalysisError> {
    pearson_named(x, y, "x", "y")
}

#[allow(clippy::cast_precision_loss)]
fn pearson_named(
    x: &[f64],
    y: &[f64],
    x_name: &str,
    y_name: &str,
) -> Result<CorrelationResult, AnalysisError> {
    if x.len() != y.len() {
        return Err(AnalysisError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }

    let n = x.len();
    if n < MIN_PAIRED_OBSERVATIONS {
        return Err(AnalysisError::InsufficientSamples {
            required: MIN_PAIRED_OBSERVATIONS,
            actual: n,
        });
    }

    for (values, name) in [(x, x_name), (y, y_name)] {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::NonFiniteValue {
                column: name.to_string(),
            });
        }
    }

    for (values, name) in [(x, x_name), (y, y_name)] {
        if values.iter().all(|v| *v == values[0]) {
            return Err(AnalysisError::DegenerateVariance {
                column: name.to_string(),
            });
        }
    }

    let count = n as f64;
    let mean_x = x.iter().sum::<f64>() / count;
    let mean_y = y.iter().sum::<f64>() / count;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let r = (covariance / (var_x * var_y).sqrt()).clamp(-1.0, 1.0);
    let p_value = correlation_p_value(r, n)?;

    Ok(CorrelationResult {
        r,
        p_value,
        sample_size: n,
    })
}

/// Two-tailed p-value for `r` from `n` pairs.
///
/// t = r * sqrt(n-2) / sqrt(1 - r^2) follows a t-distribution with n-2 degrees
/// of freedom under the null.
#[allow(clippy::cast_precision_loss)]
fn correlation_p_value(r: f64, n: usize) -> Result<f64, AnalysisError> {
    if r.abs() >= 1.0 {
        return Ok(0.0);
    }

    let df = n as f64 - 2.0;
    let t_stat = r * (df / (1.0 - r * r)).sqrt();

    let dist = StudentsT::new(0.0, 1.0, df).map_err(|_| AnalysisError::InsufficientSamples {
        required: MIN_PAIRED_OBSERVATIONS,
        actual: n,
    })?;

    let p = 2.0 * (1.0 - dist.cdf(t_stat.abs()));
    Ok(p.clamp(0.0, 1.0))
}

/// Collects the pairwise-complete values of two columns.
#[must_use]
pub fn paired_values(records: &[DailyRecord], x: Column, y: Column) -> (Vec<f64>, Vec<f64>) {
    records
        .iter()
        .filter_map(|record| Some((x.value(record)?, y.value(record)?)))
        .unzip()
}

/// Pearson correlation between two columns over the rows where both are present.
///
/// # Errors
///
/// See [`pearson`]; a constant column is reported by its column name.
pub fn correlate(
    records: &[DailyRecord],
    x: Column,
    y: Column,
) -> Result<CorrelationResult, AnalysisError> {
    let (xs, ys) = paired_values(records, x, y);
    pearson_named(&xs, &ys, x.name(), y.name())
}

/// The three canonical pairings reported for every ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationPair {
    MentionVolume,
    MentionAbsPriceChange,
    SentimentPriceChange,
}

impl CorrelationPair {
    pub const ALL: [Self; 3] = [
        Self::MentionVolume,
        Self::MentionAbsPriceChange,
        Self::SentimentPriceChange,
    ];

    #[must_use]
    pub const fn columns(self) -> (Column, Column) {
        match self {
            Self::MentionVolume => (Column::MentionCount, Column::Volume),
            Self::MentionAbsPriceChange => (Column::MentionCount, Column::AbsPctChangeClose),
            Self::SentimentPriceChange => (Column::SentimentScore, Column::PctChangeClose),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MentionVolume => "mentions vs volume",
            Self::MentionAbsPriceChange => "mentions vs |price change|",
            Self::SentimentPriceChange => "sentiment vs price change",
        }
    }

    /// Runs this pairing over a series' records.
    ///
    /// The absolute-price-change pairing first drops every record with any
    /// absent market field, then takes the absolute value.
    ///
    /// # Errors
    ///
    /// See [`correlate`].
    pub fn analyze(self, records: &[DailyRecord]) -> Result<CorrelationResult, AnalysisError> {
        let (x, y) = self.columns();

        if self == Self::MentionAbsPriceChange {
            let complete: Vec<DailyRecord> = records
                .iter()
                .copied()
                .filter(|record| record.is_complete(true))
                .collect();
            return correlate(&complete, x, y);
        }

        correlate(records, x, y)
    }
}

/// Mention count against trading volume.
///
/// # Errors
///
/// See [`correlate`].
pub fn analyze_mention_volume(records: &[DailyRecord]) -> Result<CorrelationResult, AnalysisError> {
    CorrelationPair::MentionVolume.analyze(records)
}

/// Mention count against the magnitude of the daily price change.
///
/// # Errors
///
/// See [`correlate`].
pub fn analyze_mention_abs_price(
    records: &[DailyRecord],
) -> Result<CorrelationResult, AnalysisError> {
    CorrelationPair::MentionAbsPriceChange.analyze(records)
}

/// Sentiment score against the signed daily price change.
///
/// # Errors
///
/// See [`correlate`].
pub fn analyze_sentiment_price(
    records: &[DailyRecord],
) -> Result<CorrelationResult, AnalysisError> {
    CorrelationPair::SentimentPriceChange.analyze(records)
}
