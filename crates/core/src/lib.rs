//! Core types, configuration, and error taxonomy shared by the workspace.

pub mod config;
pub mod config_loader;
pub mod error;
pub mod inputs;
pub mod series;
pub mod shift;
pub mod traits;

pub use config::{AnalysisConfig, DataPaths};
pub use config_loader::ConfigLoader;
pub use error::{AnalysisError, InputKind};
pub use inputs::{ForumActivity, MarketBar};
pub use series::{pct_change, DailyRecord, ShiftedTickerSeries, TickerSeries};
pub use shift::ShiftLabel;
pub use traits::{ForumActivitySource, MarketDataProvider};
