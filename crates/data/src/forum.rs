//! Forum activity files: one headerless CSV per ticker.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use mention_lag_core::{AnalysisError, ForumActivity, ForumActivitySource, InputKind};
use tracing::debug;

use crate::csv_storage::{csv_error, malformed, open_reader, parse_count, parse_optional};

/// Reads `<dir>/<ticker lowercased>.csv` with rows
/// `YYYYMMDD,mention_count,mention_rank,sentiment_score` and no header.
#[derive(Debug, Clone)]
pub struct CsvForumStore {
    dir: PathBuf,
}

impl CsvForumStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", ticker.to_lowercase()))
    }

    fn read(path: &Path, ticker: &str) -> Result<Vec<ForumActivity>, AnalysisError> {
        let mut reader = open_reader(path, false, ticker, InputKind::ForumActivity)?;
        let mut rows = Vec::new();

        for (idx, record) in reader.records().enumerate() {
            let line = idx as u64 + 1;
            let record = record.map_err(|e| csv_error(path, &e))?;

            if record.iter().all(str::is_empty) {
                continue;
            }

            let raw_date = record.get(0).unwrap_or_default();
            let date = NaiveDate::parse_from_str(raw_date, "%Y%m%d")
                .map_err(|_| malformed(path, line, format!("invalid date '{raw_date}'")))?;

            let mention_count = parse_optional(record.get(1), path, line, "mention_count")?
                .map(|raw| parse_count(raw, path, line, "mention_count"))
                .transpose()?;
            let mention_rank = parse_optional(record.get(2), path, line, "mention_rank")?
                .map(|raw| {
                    parse_count(raw, path, line, "mention_rank").and_then(|rank| {
                        u32::try_from(rank)
                            .map_err(|_| malformed(path, line, "mention_rank out of range"))
                    })
                })
                .transpose()?;
            let sentiment_score =
                parse_optional(record.get(3), path, line, "sentiment_score")?;

            rows.push(ForumActivity {
                date,
                mention_count,
                mention_rank,
                sentiment_score,
            });
        }

        debug!(ticker, rows = rows.len(), "read forum activity");
        Ok(rows)
    }
}

impl ForumActivitySource for CsvForumStore {
    fn load(&self, ticker: &str) -> Result<Vec<ForumActivity>, AnalysisError> {
        Self::read(&self.path_for(ticker), ticker)
    }
}
