//! Cached market-data downloads: one headered CSV per ticker.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mention_lag_core::{AnalysisError, InputKind, MarketBar, MarketDataProvider};
use tracing::debug;

use crate::csv_storage::{csv_error, malformed, open_reader, parse_optional};

/// Market-data provider over provider downloads cached at
/// `<dir>/yfinancedata_<TICKER>.csv`.
///
/// The file is headered and must carry `Date`, `Close`, and `Volume` columns;
/// other columns are ignored.
#[derive(Debug, Clone)]
pub struct CsvMarketStore {
    dir: PathBuf,
}

impl CsvMarketStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("yfinancedata_{ticker}.csv"))
    }

    fn read(path: &Path, ticker: &str) -> Result<Vec<MarketBar>, AnalysisError> {
        let mut reader = open_reader(path, true, ticker, InputKind::MarketData)?;

        let headers = reader.headers().map_err(|e| csv_error(path, &e))?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| malformed(path, 1, format!("missing '{name}' column")))
        };
        let date_idx = column("Date")?;
        let close_idx = column("Close")?;
        let volume_idx = column("Volume")?;

        let mut bars = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let line = idx as u64 + 2;
            let record = record.map_err(|e| csv_error(path, &e))?;

            let raw_date = record.get(date_idx).unwrap_or_default();
            let date = parse_market_date(raw_date)
                .ok_or_else(|| malformed(path, line, format!("invalid date '{raw_date}'")))?;

            let close = parse_optional(record.get(close_idx), path, line, "Close")?;
            let volume = parse_optional(record.get(volume_idx), path, line, "Volume")?;

            match (close, volume) {
                (Some(close), Some(volume)) => bars.push(MarketBar::new(date, close, volume)),
                _ => debug!(ticker, %date, "skipping market row without close/volume"),
            }
        }

        bars.sort_by_key(|bar| bar.date);
        Ok(bars)
    }
}

/// Accepts `YYYY-MM-DD` or a timestamp with UTC offset; timestamps are
/// converted to UTC before taking the calendar date.
fn parse_market_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|ts| ts.with_timezone(&Utc).date_naive())
}

#[async_trait]
impl MarketDataProvider for CsvMarketStore {
    async fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MarketBar>, AnalysisError> {
        let bars = Self::read(&self.path_for(ticker), ticker)?;
        Ok(bars
            .into_iter()
            .filter(|bar| bar.date >= start && bar.date <= end)
            .collect())
    }
}
