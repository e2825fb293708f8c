//! Per-ticker daily series aligned on a calendar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// One calendar day of merged forum and market data.
///
/// Forum fields are always present (silence is a real zero). Market fields are
/// absent on days without a market record, and `pct_change_close` is absent until
/// derived and wherever either adjacent close is absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub mention_count: u64,
    pub mention_rank: u32,
    pub sentiment_score: f64,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub pct_change_close: Option<f64>,
}

impl DailyRecord {
    /// A day with no forum record and no market record.
    #[must_use]
    pub const fn silent(date: NaiveDate) -> Self {
        Self {
            date,
            mention_count: 0,
            mention_rank: 0,
            sentiment_score: 0.0,
            close: None,
            volume: None,
            pct_change_close: None,
        }
    }

    #[must_use]
    pub const fn has_market_data(&self) -> bool {
        self.close.is_some() && self.volume.is_some()
    }

    /// True if every market field is present, including percent change once derived.
    #[must_use]
    pub const fn is_complete(&self, pct_change_derived: bool) -> bool {
        self.has_market_data() && (!pct_change_derived || self.pct_change_close.is_some())
    }
}

/// Daily records for one ticker covering a contiguous calendar, one record per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TickerSeriesRepr")]
pub struct TickerSeries {
    ticker: String,
    records: Vec<DailyRecord>,
    pct_change_derived: bool,
}

#[derive(Deserialize)]
struct TickerSeriesRepr {
    ticker: String,
    records: Vec<DailyRecord>,
    pct_change_derived: bool,
}

impl TryFrom<TickerSeriesRepr> for TickerSeries {
    type Error = AnalysisError;

    fn try_from(repr: TickerSeriesRepr) -> Result<Self, Self::Error> {
        let series = Self::new(repr.ticker, repr.records)?;
        Ok(if repr.pct_change_derived {
            series.with_pct_change()
        } else {
            series
        })
    }
}

impl TickerSeries {
    /// Builds a series, checking that dates are contiguous with no gaps or duplicates.
    ///
    /// Any percent-change values on the input are cleared; derive them afterwards.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidSeries` if the series is empty or the dates
    /// do not advance by exactly one day per record.
    pub fn new(
        ticker: impl Into<String>,
        mut records: Vec<DailyRecord>,
    ) -> Result<Self, AnalysisError> {
        let ticker = ticker.into();

        if records.is_empty() {
            return Err(AnalysisError::InvalidSeries {
                ticker,
                reason: "no records".to_string(),
            });
        }

        for pair in records.windows(2) {
            if pair[0].date.succ_opt() != Some(pair[1].date) {
                return Err(AnalysisError::InvalidSeries {
                    ticker,
                    reason: format!(
                        "dates not contiguous: {} followed by {}",
                        pair[0].date, pair[1].date
                    ),
                });
            }
        }

        for record in &mut records {
            record.pct_change_close = None;
        }

        Ok(Self {
            ticker,
            records,
            pct_change_derived: false,
        })
    }

    /// Builds a series that must span exactly `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidSeries` if the calendar invariant fails or
    /// the series does not start and end on the configured window.
    pub fn from_window(
        ticker: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        records: Vec<DailyRecord>,
    ) -> Result<Self, AnalysisError> {
        let series = Self::new(ticker, records)?;

        if series.start_date() != start || series.end_date() != end {
            return Err(AnalysisError::InvalidSeries {
                ticker: series.ticker,
                reason: format!(
                    "covers {}..={} but window is {start}..={end}",
                    series.records[0].date,
                    series.records[series.records.len() - 1].date
                ),
            });
        }

        Ok(series)
    }

    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    #[must_use]
    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.records[0].date
    }

    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.records[self.records.len() - 1].date
    }

    #[must_use]
    pub const fn has_pct_change(&self) -> bool {
        self.pct_change_derived
    }

    /// Derives percent change from the close column.
    #[must_use]
    pub fn with_pct_change(mut self) -> Self {
        assign(&mut self.records);
        self.pct_change_derived = true;
        self
    }
}

/// A ticker series whose forum columns were offset relative to its market columns.
///
/// Rows left incomplete by the offset are gone, so dates are strictly increasing
/// but may skip days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftedTickerSeries {
    ticker: String,
    offset: i32,
    records: Vec<DailyRecord>,
    pct_change_derived: bool,
}

impl ShiftedTickerSeries {
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidSeries` if dates are not strictly increasing.
    pub fn new(
        ticker: impl Into<String>,
        offset: i32,
        records: Vec<DailyRecord>,
        pct_change_derived: bool,
    ) -> Result<Self, AnalysisError> {
        let ticker = ticker.into();

        if let Some(pair) = records.windows(2).find(|pair| pair[0].date >= pair[1].date) {
            return Err(AnalysisError::InvalidSeries {
                ticker,
                reason: format!(
                    "shifted dates not increasing: {} followed by {}",
                    pair[0].date, pair[1].date
                ),
            });
        }

        Ok(Self {
            ticker,
            offset,
            records,
            pct_change_derived,
        })
    }

    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    #[must_use]
    pub const fn offset(&self) -> i32 {
        self.offset
    }

    #[must_use]
    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub const fn has_pct_change(&self) -> bool {
        self.pct_change_derived
    }

    /// Re-derives percent change over the surviving rows.
    ///
    /// A row is only compared with the calendar day before it. Rows whose
    /// previous day was dropped end up without a value and are dropped too, so
    /// the row count never grows.
    #[must_use]
    pub fn with_pct_change(mut self) -> Self {
        assign(&mut self.records);
        self.records.retain(|record| record.pct_change_close.is_some());
        self.pct_change_derived = true;
        self
    }
}

/// Day-over-day percent change of close, as a decimal.
///
/// A row has a value only if the previous row is the previous calendar day and
/// both closes are present, with the previous close non-zero.
#[must_use]
pub fn pct_change(records: &[DailyRecord]) -> Vec<Option<f64>> {
    let mut values = Vec::with_capacity(records.len());
    values.push(None);

    values.extend(records.windows(2).map(|pair| {
        if pair[0].date.succ_opt() != Some(pair[1].date) {
            return None;
        }
        match (pair[0].close, pair[1].close) {
            (Some(prev), Some(curr)) if prev != 0.0 => Some((curr - prev) / prev),
            _ => None,
        }
    }));

    values.truncate(records.len());
    values
}

fn assign(records: &mut [DailyRecord]) {
    let values = pct_change(records);
    for (record, value) in records.iter_mut().zip(values) {
        record.pct_change_close = value;
    }
}
