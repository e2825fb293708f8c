//! Error taxonomy shared by every crate in the workspace.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// External input a ticker depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    ForumActivity,
    MarketData,
    MergedTable,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ForumActivity => "forum activity",
            Self::MarketData => "market data",
            Self::MergedTable => "merged table",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AnalysisError {
    /// A required external file or record cannot be located.
    #[error("{input} for {ticker} not found at {}", path.display())]
    MissingInput {
        ticker: String,
        input: InputKind,
        path: PathBuf,
    },

    /// An input exists but cannot be parsed.
    #[error("malformed input {}: {reason}", path.display())]
    MalformedInput { path: PathBuf, reason: String },

    #[error("IO error on {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    /// Fewer paired observations than a correlation needs.
    #[error("insufficient samples: need at least {required}, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    /// A correlation input column is constant.
    #[error("zero variance in {column}; correlation is undefined")]
    DegenerateVariance { column: String },

    /// A correlation input holds NaN or an infinity.
    #[error("non-finite value in {column}")]
    NonFiniteValue { column: String },

    #[error("series length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Daily calendar invariant violated.
    #[error("invalid series for {ticker}: {reason}")]
    InvalidSeries { ticker: String, reason: String },

    #[error("no series for {ticker} under shift {shift}")]
    UnknownTicker { ticker: String, shift: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AnalysisError {
    /// Wraps an IO error with the path it occurred on.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Returns true for input gaps a batch may skip with a warning.
    #[must_use]
    pub const fn is_missing_input(&self) -> bool {
        matches!(self, Self::MissingInput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_message_names_ticker_and_path() {
        let err = AnalysisError::MissingInput {
            ticker: "NVDA".to_string(),
            input: InputKind::MarketData,
            path: PathBuf::from("data/raw_yfinance/yfinancedata_NVDA.csv"),
        };
        let msg = err.to_string();
        assert!(msg.contains("market data"));
        assert!(msg.contains("NVDA"));
        assert!(msg.contains("yfinancedata_NVDA.csv"));
        assert!(err.is_missing_input());
    }

    #[test]
    fn insufficient_samples_message() {
        let err = AnalysisError::InsufficientSamples {
            required: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "insufficient samples: need at least 3, got 2"
        );
        assert!(!err.is_missing_input());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let err = AnalysisError::DegenerateVariance {
            column: "Close".to_string(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "degenerate_variance");
        assert_eq!(json["detail"]["column"], "Close");
    }
}
