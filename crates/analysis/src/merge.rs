//! Calendar merger: aligns sparse forum and market inputs on a full daily calendar.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use mention_lag_core::{
    AnalysisConfig, AnalysisError, DailyRecord, ForumActivity, ForumActivitySource, MarketBar,
    MarketDataProvider, TickerSeries,
};
use tracing::{error, info, warn};

/// Result of merging a whole ticker universe.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// Successfully merged series, in configured ticker order
    pub merged: Vec<TickerSeries>,
    /// Tickers skipped because they have no forum input
    pub skipped: Vec<String>,
    /// Tickers whose merge failed, with the reason
    pub failures: BTreeMap<String, AnalysisError>,
}

/// Merges one ticker's inputs onto the daily calendar `[start, end]`.
///
/// Days without a forum row get zero mentions, zero rank, and zero sentiment.
/// Days without a market row keep close and volume absent. Rows outside the
/// window are ignored; for a repeated date the first row wins.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidSeries` if `start` is after `end`.
pub fn merge_ticker(
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
    forum: &[ForumActivity],
    market: &[MarketBar],
) -> Result<TickerSeries, AnalysisError> {
    if start > end {
        return Err(AnalysisError::InvalidSeries {
            ticker: ticker.to_string(),
            reason: format!("window start {start} is after end {end}"),
        });
    }

    let forum_by_date = index_by_date(ticker, "forum", forum, |row| row.date, start, end);
    let market_by_date = index_by_date(ticker, "market", market, |bar| bar.date, start, end);

    let records = start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| {
            let mut record = DailyRecord::silent(date);

            if let Some(row) = forum_by_date.get(&date) {
                record.mention_count = row.mention_count.unwrap_or(0);
                record.mention_rank = row.mention_rank.unwrap_or(0);
                record.sentiment_score = row.sentiment_score.unwrap_or(0.0);
            }

            if let Some(bar) = market_by_date.get(&date) {
                record.close = Some(bar.close);
                record.volume = Some(bar.volume);
            }

            record
        })
        .collect();

    TickerSeries::from_window(ticker, start, end, records)
}

fn index_by_date<'a, T>(
    ticker: &str,
    source: &str,
    rows: &'a [T],
    date_of: impl Fn(&T) -> NaiveDate,
    start: NaiveDate,
    end: NaiveDate,
) -> BTreeMap<NaiveDate, &'a T> {
    let mut by_date = BTreeMap::new();

    for row in rows {
        let date = date_of(row);
        if date < start || date > end {
            continue;
        }
        match by_date.entry(date) {
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
            Entry::Occupied(_) => {
                warn!(ticker, source, %date, "duplicate input date; keeping first row");
            }
        }
    }

    by_date
}

/// Merges every configured ticker, isolating per-ticker failures.
///
/// A ticker without forum input is skipped with a warning. A ticker whose market
/// data cannot be fetched, or whose forum input fails for any other reason, is
/// recorded in `failures`; the batch continues either way.
pub async fn merge_universe(
    config: &AnalysisConfig,
    forum_source: &dyn ForumActivitySource,
    market_provider: &dyn MarketDataProvider,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for ticker in &config.tickers {
        let forum = match forum_source.load(ticker) {
            Ok(rows) => rows,
            Err(err) if err.is_missing_input() => {
                warn!(ticker = %ticker, "{err}; skipping");
                outcome.skipped.push(ticker.clone());
                continue;
            }
            Err(err) => {
                error!(ticker = %ticker, "failed to load forum activity: {err}");
                outcome.failures.insert(ticker.clone(), err);
                continue;
            }
        };

        let market = match market_provider
            .fetch(ticker, config.start_date, config.end_date)
            .await
        {
            Ok(bars) => bars,
            Err(err) => {
                error!(ticker = %ticker, "failed to fetch market data: {err}");
                outcome.failures.insert(ticker.clone(), err);
                continue;
            }
        };

        match merge_ticker(ticker, config.start_date, config.end_date, &forum, &market) {
            Ok(series) => {
                info!(
                    ticker = %ticker,
                    days = series.len(),
                    forum_rows = forum.len(),
                    market_rows = market.len(),
                    "merged ticker"
                );
                outcome.merged.push(series);
            }
            Err(err) => {
                error!(ticker = %ticker, "merge failed: {err}");
                outcome.failures.insert(ticker.clone(), err);
            }
        }
    }

    outcome
}
