//! CSV-backed storage for the mention lead/lag workspace.
//!
//! This crate provides:
//! - `CsvForumStore`: the forum-activity source over headerless per-ticker files
//! - `CsvMarketStore`: a market-data provider over cached provider downloads
//! - `MergedTableStore`: the persisted per-ticker merged daily tables

pub mod csv_storage;
pub mod forum;
pub mod market;

pub use csv_storage::MergedTableStore;
pub use forum::CsvForumStore;
pub use market::CsvMarketStore;
