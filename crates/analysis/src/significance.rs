//! Bonferroni multiple-comparisons gate.

use mention_lag_core::{AnalysisConfig, AnalysisError};
use serde::{Deserialize, Serialize};

use crate::correlation::CorrelationPair;

/// Significance threshold adjusted for the number of independent comparisons.
///
/// A result is significant only if its p-value is strictly below
/// `alpha / comparisons`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonferroniGate {
    alpha: f64,
    comparisons: usize,
}

impl BonferroniGate {
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` if `alpha` is outside (0, 1) or
    /// `comparisons` is zero.
    pub fn new(alpha: f64, comparisons: usize) -> Result<Self, AnalysisError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "alpha must be in (0, 1), got {alpha}"
            )));
        }
        if comparisons == 0 {
            return Err(AnalysisError::InvalidConfig(
                "at least one comparison is required".to_string(),
            ));
        }

        Ok(Self { alpha, comparisons })
    }

    /// One comparison per configured ticker.
    ///
    /// # Errors
    ///
    /// See [`BonferroniGate::new`].
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        Self::new(config.alpha, config.num_comparisons())
    }

    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    #[must_use]
    pub const fn comparisons(&self) -> usize {
        self.comparisons
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn threshold(&self) -> f64 {
        self.alpha / self.comparisons as f64
    }

    #[must_use]
    pub fn is_significant(&self, p_value: f64) -> bool {
        p_value < self.threshold()
    }

    /// Flags the three canonical p-values of one ticker.
    #[must_use]
    pub fn flag(&self, p_values: [f64; 3]) -> SignificanceFlags {
        SignificanceFlags {
            mention_volume: self.is_significant(p_values[0]),
            mention_abs_price: self.is_significant(p_values[1]),
            sentiment_price: self.is_significant(p_values[2]),
        }
    }
}

/// Per-ticker significance of the three canonical pairings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignificanceFlags {
    pub mention_volume: bool,
    pub mention_abs_price: bool,
    pub sentiment_price: bool,
}

impl SignificanceFlags {
    #[must_use]
    pub const fn get(&self, pair: CorrelationPair) -> bool {
        match pair {
            CorrelationPair::MentionVolume => self.mention_volume,
            CorrelationPair::MentionAbsPriceChange => self.mention_abs_price,
            CorrelationPair::SentimentPriceChange => self.sentiment_price,
        }
    }

    #[must_use]
    pub const fn any(&self) -> bool {
        self.mention_volume || self.mention_abs_price || self.sentiment_price
    }
}
