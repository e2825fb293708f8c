//! Raw rows handed over by the external collaborators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of forum chatter about a ticker, as supplied by the forum source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForumActivity {
    pub date: NaiveDate,
    pub mention_count: Option<u64>,
    pub mention_rank: Option<u32>,
    pub sentiment_score: Option<f64>,
}

impl ForumActivity {
    #[must_use]
    pub const fn new(
        date: NaiveDate,
        mention_count: u64,
        mention_rank: u32,
        sentiment_score: f64,
    ) -> Self {
        Self {
            date,
            mention_count: Some(mention_count),
            mention_rank: Some(mention_rank),
            sentiment_score: Some(sentiment_score),
        }
    }
}

/// One daily bar from the market-data provider. Only close and volume are analysed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketBar {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
}

impl MarketBar {
    #[must_use]
    pub const fn new(date: NaiveDate, close: f64, volume: f64) -> Self {
        Self {
            date,
            close,
            volume,
        }
    }
}
