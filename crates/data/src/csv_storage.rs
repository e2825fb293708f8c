//! CSV plumbing shared by the stores, plus the persisted merged table.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{Reader, ReaderBuilder, Trim, Writer};
use mention_lag_core::{AnalysisConfig, AnalysisError, DailyRecord, InputKind, TickerSeries};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Opens a CSV file, reporting a missing file as `MissingInput` for `ticker`.
pub(crate) fn open_reader(
    path: &Path,
    has_headers: bool,
    ticker: &str,
    input: InputKind,
) -> Result<Reader<File>, AnalysisError> {
    if !path.exists() {
        return Err(AnalysisError::MissingInput {
            ticker: ticker.to_string(),
            input,
            path: path.to_path_buf(),
        });
    }

    ReaderBuilder::new()
        .has_headers(has_headers)
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, &e))
}

pub(crate) fn csv_error(path: &Path, err: &csv::Error) -> AnalysisError {
    match err.kind() {
        csv::ErrorKind::Io(io) => AnalysisError::io(path, io),
        _ => AnalysisError::MalformedInput {
            path: path.to_path_buf(),
            reason: err.to_string(),
        },
    }
}

pub(crate) fn malformed(path: &Path, line: u64, reason: impl Into<String>) -> AnalysisError {
    AnalysisError::MalformedInput {
        path: path.to_path_buf(),
        reason: format!("line {line}: {}", reason.into()),
    }
}

/// Parses an optional numeric cell; an empty cell is absent.
///
/// `nan` and `inf` parse as floats but are rejected as malformed.
pub(crate) fn parse_optional(
    cell: Option<&str>,
    path: &Path,
    line: u64,
    column: &str,
) -> Result<Option<f64>, AnalysisError> {
    match cell.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(value)),
            _ => Err(malformed(path, line, format!("invalid {column} '{raw}'"))),
        },
    }
}

/// Rejects a non-finite value read from a typed row.
pub(crate) fn ensure_finite(
    value: f64,
    path: &Path,
    line: u64,
    column: &str,
) -> Result<f64, AnalysisError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(malformed(path, line, format!("invalid {column} '{value}'")))
    }
}

/// Reads a count cell that may have been written as `5` or `5.0`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn parse_count(raw: f64, path: &Path, line: u64, column: &str) -> Result<u64, AnalysisError> {
    if raw.is_finite() && raw >= 0.0 && raw.fract() == 0.0 {
        Ok(raw as u64)
    } else {
        Err(malformed(
            path,
            line,
            format!("{column} must be a non-negative integer, got {raw}"),
        ))
    }
}

#[derive(Serialize)]
struct MergedRowOut {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Mention_Count")]
    mention_count: u64,
    #[serde(rename = "Mention_Rank")]
    mention_rank: u32,
    #[serde(rename = "Sentiment_Score")]
    sentiment_score: f64,
    #[serde(rename = "Close")]
    close: Option<f64>,
    #[serde(rename = "Volume")]
    volume: Option<f64>,
}

#[derive(Deserialize)]
struct MergedRowIn {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Mention_Count")]
    mention_count: f64,
    #[serde(rename = "Mention_Rank")]
    mention_rank: f64,
    #[serde(rename = "Sentiment_Score")]
    sentiment_score: f64,
    #[serde(rename = "Close")]
    close: Option<f64>,
    #[serde(rename = "Volume")]
    volume: Option<f64>,
}

/// One merged table per ticker: `<dir>/<TICKER>_merged.csv`.
///
/// Columns: `Date,Mention_Count,Mention_Rank,Sentiment_Score,Close,Volume`.
/// Absent market values are empty cells. Saving overwrites any previous file.
#[derive(Debug, Clone)]
pub struct MergedTableStore {
    dir: PathBuf,
}

impl MergedTableStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}_merged.csv"))
    }

    /// Writes the merged table for `series`, replacing any earlier output.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::Io` if the directory or file cannot be written.
    pub fn save(&self, series: &TickerSeries) -> Result<PathBuf, AnalysisError> {
        fs::create_dir_all(&self.dir).map_err(|e| AnalysisError::io(&self.dir, &e))?;

        let path = self.path_for(series.ticker());
        let mut writer = Writer::from_path(&path).map_err(|e| csv_error(&path, &e))?;

        for record in series.records() {
            writer
                .serialize(MergedRowOut {
                    date: record.date,
                    mention_count: record.mention_count,
                    mention_rank: record.mention_rank,
                    sentiment_score: record.sentiment_score,
                    close: record.close,
                    volume: record.volume,
                })
                .map_err(|e| csv_error(&path, &e))?;
        }

        writer.flush().map_err(|e| AnalysisError::io(&path, &e))?;
        info!(ticker = series.ticker(), path = %path.display(), rows = series.len(), "saved merged table");

        Ok(path)
    }

    /// Loads a merged table and re-checks the daily calendar invariant.
    ///
    /// # Errors
    ///
    /// Returns `MissingInput` if no table exists for `ticker`, `MalformedInput`
    /// if a row cannot be parsed, and `InvalidSeries` if the dates have gaps.
    pub fn load(&self, ticker: &str) -> Result<TickerSeries, AnalysisError> {
        let path = self.path_for(ticker);
        let mut reader = open_reader(&path, true, ticker, InputKind::MergedTable)?;

        let mut records = Vec::new();
        for (idx, row) in reader.deserialize::<MergedRowIn>().enumerate() {
            let line = idx as u64 + 2;
            let row = row.map_err(|e| csv_error(&path, &e))?;
            records.push(DailyRecord {
                date: row.date,
                mention_count: parse_count(row.mention_count, &path, line, "Mention_Count")?,
                mention_rank: u32::try_from(parse_count(
                    row.mention_rank,
                    &path,
                    line,
                    "Mention_Rank",
                )?)
                .map_err(|_| malformed(&path, line, "Mention_Rank out of range"))?,
                sentiment_score: ensure_finite(row.sentiment_score, &path, line, "Sentiment_Score")?,
                close: row
                    .close
                    .map(|v| ensure_finite(v, &path, line, "Close"))
                    .transpose()?,
                volume: row
                    .volume
                    .map(|v| ensure_finite(v, &path, line, "Volume"))
                    .transpose()?,
                pct_change_close: None,
            });
        }

        TickerSeries::new(ticker, records)
    }

    /// Loads every configured ticker that has a merged table, warning on the rest.
    ///
    /// Series come back in configured ticker order.
    ///
    /// # Errors
    ///
    /// Missing tables are skipped; any other failure (malformed file, series not
    /// spanning the configured window) is returned.
    pub fn load_universe(
        &self,
        config: &AnalysisConfig,
    ) -> Result<Vec<TickerSeries>, AnalysisError> {
        let mut universe = Vec::with_capacity(config.tickers.len());

        for ticker in &config.tickers {
            match self.load(ticker) {
                Ok(series) => {
                    let series = TickerSeries::from_window(
                        ticker.as_str(),
                        config.start_date,
                        config.end_date,
                        series.records().to_vec(),
                    )?;
                    info!(ticker = %ticker, rows = series.len(), "loaded merged table");
                    universe.push(series);
                }
                Err(err) if err.is_missing_input() => {
                    warn!(ticker = %ticker, "{err}");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(universe)
    }
}
