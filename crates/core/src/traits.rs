use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::AnalysisError;
use crate::inputs::{ForumActivity, MarketBar};

/// External market-data provider returning daily bars for a ticker and window.
///
/// Network or rate-limit failures are not retried here; they surface to the caller.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MarketBar>, AnalysisError>;
}

/// Read-only per-ticker forum activity with arbitrary date coverage.
pub trait ForumActivitySource: Send + Sync {
    /// # Errors
    ///
    /// Returns `AnalysisError::MissingInput` when the ticker has no forum input.
    fn load(&self, ticker: &str) -> Result<Vec<ForumActivity>, AnalysisError>;
}
