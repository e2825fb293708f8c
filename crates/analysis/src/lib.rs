//! Forum activity against market data.
//!
//! Merges daily forum mention/sentiment records with market bars on a complete
//! calendar, derives price changes, and tests whether forum activity moves with
//! volume and price:
//!
//! - [`merge`]: calendar merger
//! - [`transform`]: percent change and lead/lag shifting
//! - [`correlation`]: Pearson correlation with Student-t p-values
//! - [`lead_lag`]: seven-shift profile and lead/lag indicator
//! - [`significance`]: Bonferroni gate
//! - [`report`]: batch runs over a ticker universe

pub mod correlation;
pub mod lead_lag;
pub mod merge;
pub mod report;
pub mod significance;
pub mod transform;

pub use correlation::{
    analyze_mention_abs_price, analyze_mention_volume, analyze_sentiment_price, correlate,
    pearson, Column, CorrelationPair, CorrelationResult, MIN_PAIRED_OBSERVATIONS,
};
pub use lead_lag::{
    analyze_lead_lag, lead_lag_indicator, LeadLagSummary, ShiftCorrelation,
    LEAD_LAG_MIN_OBSERVATIONS,
};
pub use merge::{merge_ticker, merge_universe, MergeOutcome};
pub use report::{
    run_all_correlations, run_lead_lag, CorrelationReport, LeadLagReport, TickerCorrelations,
};
pub use significance::{BonferroniGate, SignificanceFlags};
pub use transform::{
    build_lead_lag_data, derive_universe_pct_change, shift, shift_universe, LeadLagData,
};
