//! Series transformer: percent change and lead/lag shifting.

use std::collections::BTreeMap;

use mention_lag_core::{AnalysisError, DailyRecord, ShiftLabel, ShiftedTickerSeries, TickerSeries};
use tracing::debug;

pub use mention_lag_core::pct_change;

/// Derives percent change for every series in a universe that lacks it.
///
/// Universe order is kept.
#[must_use]
pub fn derive_universe_pct_change(universe: Vec<TickerSeries>) -> Vec<TickerSeries> {
    universe
        .into_iter()
        .map(|series| {
            if series.has_pct_change() {
                series
            } else {
                series.with_pct_change()
            }
        })
        .collect()
}

/// Offsets the forum columns by `offset` rows relative to the market columns.
///
/// Row `t` of the result carries the market fields of row `t` and the forum
/// fields of row `t + offset`: a negative offset (lead) pairs each price with
/// sentiment from earlier days, a positive offset (lag) with sentiment from
/// later days. Rows without a forum source row, without close or volume, or
/// (once derived) without percent change are dropped.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidSeries` only if the result violates date
/// ordering, which a valid input series cannot produce.
pub fn shift(series: &TickerSeries, offset: i32) -> Result<ShiftedTickerSeries, AnalysisError> {
    let records = series.records();
    let derived = series.has_pct_change();

    let shifted: Vec<DailyRecord> = records
        .iter()
        .enumerate()
        .filter_map(|(t, record)| {
            let source_idx = isize::try_from(t).ok()?.checked_add(isize::try_from(offset).ok()?)?;
            let source = records.get(usize::try_from(source_idx).ok()?)?;

            let row = DailyRecord {
                mention_count: source.mention_count,
                mention_rank: source.mention_rank,
                sentiment_score: source.sentiment_score,
                ..*record
            };
            row.is_complete(derived).then_some(row)
        })
        .collect();

    debug!(
        ticker = series.ticker(),
        offset,
        kept = shifted.len(),
        dropped = records.len() - shifted.len(),
        "shifted series"
    );

    ShiftedTickerSeries::new(series.ticker(), offset, shifted, derived)
}

/// Shifts every ticker independently; no rows cross between tickers.
///
/// # Errors
///
/// Returns the first shift failure.
pub fn shift_universe(
    universe: &[TickerSeries],
    offset: i32,
) -> Result<BTreeMap<String, ShiftedTickerSeries>, AnalysisError> {
    universe
        .iter()
        .map(|series| Ok((series.ticker().to_string(), shift(series, offset)?)))
        .collect()
}

/// Shifted views of a universe for all seven lead/lag shifts.
#[derive(Debug, Clone, Default)]
pub struct LeadLagData {
    tickers: Vec<String>,
    shifts: BTreeMap<ShiftLabel, BTreeMap<String, ShiftedTickerSeries>>,
}

impl LeadLagData {
    /// Looks up one ticker's series under one shift.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::UnknownTicker` if the ticker was not shifted under `label`.
    pub fn get(
        &self,
        label: ShiftLabel,
        ticker: &str,
    ) -> Result<&ShiftedTickerSeries, AnalysisError> {
        self.shifts
            .get(&label)
            .and_then(|by_ticker| by_ticker.get(ticker))
            .ok_or_else(|| AnalysisError::UnknownTicker {
                ticker: ticker.to_string(),
                shift: label.to_string(),
            })
    }

    /// Tickers in universe order.
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.tickers.iter().map(String::as_str)
    }
}

/// Builds the seven shifted views of every ticker.
///
/// # Errors
///
/// Returns the first shift failure.
pub fn build_lead_lag_data(universe: &[TickerSeries]) -> Result<LeadLagData, AnalysisError> {
    let mut data = LeadLagData {
        tickers: universe
            .iter()
            .map(|series| series.ticker().to_string())
            .collect(),
        shifts: BTreeMap::new(),
    };

    for label in ShiftLabel::ALL {
        data.shifts
            .insert(label, shift_universe(universe, label.offset())?);
    }

    Ok(data)
}
