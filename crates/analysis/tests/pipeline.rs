//! End-to-end: raw CSV inputs through merge, persistence, correlation, and lead/lag.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use mention_lag_analysis::{
    merge_universe, run_all_correlations, run_lead_lag, BonferroniGate, CorrelationPair,
};
use mention_lag_core::{AnalysisConfig, DataPaths, ShiftLabel};
use mention_lag_data::{CsvForumStore, CsvMarketStore, MergedTableStore};
use tempfile::TempDir;

const CLOSES: [f64; 10] = [100.0, 101.0, 99.0, 99.0, 105.0, 106.0, 104.0, 103.0, 108.0, 110.0];
const VOLUMES: [u64; 10] = [1000, 1500, 900, 1100, 3000, 2500, 1200, 1000, 4000, 3500];

fn config(root: &Path) -> AnalysisConfig {
    AnalysisConfig {
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        paths: DataPaths {
            raw_forum_dir: root.join("raw_wsb"),
            raw_market_dir: root.join("raw_yfinance"),
            merged_dir: root.join("merged"),
        },
        ..AnalysisConfig::default()
    }
}

fn write_inputs(config: &AnalysisConfig) {
    fs::create_dir_all(&config.paths.raw_forum_dir).unwrap();
    fs::create_dir_all(&config.paths.raw_market_dir).unwrap();

    // Forum activity every other day, plus one row before the window.
    fs::write(
        config.paths.raw_forum_dir.join("nvda.csv"),
        "20231231,99,1,0.9\n\
         20240101,5,3,0.2\n\
         20240103,0,0,-0.1\n\
         20240105,10,2,0.5\n\
         20240107,0,0,0.0\n\
         20240109,20,1,0.8\n",
    )
    .unwrap();

    let mut market = String::from("Date,Open,High,Low,Close,Volume,Dividends,Stock Splits\n");
    for (i, (close, volume)) in CLOSES.iter().zip(VOLUMES).enumerate() {
        market.push_str(&format!(
            "2024-01-{:02} 00:00:00-05:00,{close},{close},{close},{close},{volume},0.0,0.0\n",
            i + 1
        ));
    }
    fs::write(
        config.paths.raw_market_dir.join("yfinancedata_NVDA.csv"),
        market,
    )
    .unwrap();

    // Market data without forum data: skipped, not failed.
    fs::write(
        config.paths.raw_market_dir.join("yfinancedata_TSLA.csv"),
        "Date,Close,Volume\n2024-01-02,250.0,900\n",
    )
    .unwrap();

    // Forum data without market data: failed.
    fs::write(config.paths.raw_forum_dir.join("spy.csv"), "20240102,4,1,0.1\n").unwrap();
}

#[tokio::test]
async fn merges_persists_and_correlates() {
    let tmp = TempDir::new().unwrap();
    let config = config(tmp.path());
    write_inputs(&config);

    let forum = CsvForumStore::new(&config.paths.raw_forum_dir);
    let market = CsvMarketStore::new(&config.paths.raw_market_dir);
    let outcome = merge_universe(&config, &forum, &market).await;

    let merged: Vec<&str> = outcome.merged.iter().map(|s| s.ticker()).collect();
    assert_eq!(merged, vec!["NVDA"]);
    assert!(outcome.skipped.contains(&"TSLA".to_string()));
    assert!(outcome.failures["SPY"].is_missing_input());

    let store = MergedTableStore::new(&config.paths.merged_dir);
    for series in &outcome.merged {
        store.save(series).unwrap();
    }

    let universe = store.load_universe(&config).unwrap();
    assert_eq!(universe.len(), 1);
    let nvda = &universe[0];
    assert_eq!(nvda.ticker(), "NVDA");
    assert_eq!(nvda.len(), 10);
    assert_eq!(nvda.records()[0].mention_count, 5);
    assert_eq!(nvda.records()[1].mention_count, 0);
    assert_eq!(nvda.records()[1].sentiment_score, 0.0);
    assert_eq!(nvda.records()[9].close, Some(110.0));
    // Days 4, 6, 8 and 10 have no forum row.
    for idx in [3, 5, 7, 9] {
        assert_eq!(nvda.records()[idx].mention_count, 0);
        assert_eq!(nvda.records()[idx].sentiment_score, 0.0);
    }

    let derived = nvda.clone().with_pct_change();
    assert_eq!(derived.records()[0].pct_change_close, None);
    assert!((derived.records()[1].pct_change_close.unwrap() - 0.01).abs() < 1e-12);

    let gate = BonferroniGate::from_config(&config).unwrap();
    let report = run_all_correlations(&universe, &gate);
    assert!(report.failures.is_empty());

    let entry = report.entry("NVDA").unwrap();

    let mv = entry.get(CorrelationPair::MentionVolume);
    assert!((mv.r - 0.651_805_976_766_402_2).abs() < 1e-9);
    assert!((mv.p_value - 0.041_142_256_729_578).abs() < 1e-6);
    assert_eq!(mv.sample_size, 10);

    let ma = entry.get(CorrelationPair::MentionAbsPriceChange);
    assert!((ma.r - 0.823_305_419_086_832_5).abs() < 1e-9);
    assert!((ma.p_value - 0.006_393_758_644_986_229).abs() < 1e-6);
    assert_eq!(ma.sample_size, 9);

    let sp = entry.get(CorrelationPair::SentimentPriceChange);
    assert!((sp.r - 0.847_309_570_020_029_5).abs() < 1e-9);
    assert!((sp.p_value - 0.003_931_726_610_767_317).abs() < 1e-6);
    assert_eq!(sp.sample_size, 9);

    // Six tickers under test: threshold 0.05 / 6.
    assert!(!entry.significant.mention_volume);
    assert!(entry.significant.mention_abs_price);
    assert!(entry.significant.sentiment_price);
    assert_eq!(report.significant_count(), 2);
}

#[tokio::test]
async fn lead_lag_runs_on_reloaded_tables() {
    let tmp = TempDir::new().unwrap();
    let config = config(tmp.path());
    write_inputs(&config);

    let forum = CsvForumStore::new(&config.paths.raw_forum_dir);
    let market = CsvMarketStore::new(&config.paths.raw_market_dir);
    let outcome = merge_universe(&config, &forum, &market).await;

    let store = MergedTableStore::new(&config.paths.merged_dir);
    for series in &outcome.merged {
        store.save(series).unwrap();
    }
    let universe = store.load_universe(&config).unwrap();

    let report = run_lead_lag(&universe).unwrap();
    let summary = report.entry("NVDA").unwrap();

    let correlations = summary.correlations();
    let leads = (correlations[4] + correlations[5] + correlations[6]) / 3.0;
    let lags = (correlations[0] + correlations[1] + correlations[2]) / 3.0;
    assert!((summary.indicator - (leads - lags)).abs() < 1e-12);
    assert!((summary.zero_lag_correlation - 0.847_309_570_020_029_5).abs() < 1e-9);
    assert!((summary.correlation(ShiftLabel::Zero) - summary.zero_lag_correlation).abs() < 1e-15);
    assert_eq!(summary.low_confidence_shifts().count(), 0);
}
