//! The watchlist screen loop.
//!
//! Fetches each symbol once, annotates it, asks the buy-signal filter for a
//! verdict, and builds the cross-instrument comparison table. Instruments are
//! independent, so the per-symbol work runs on a rayon pool; one failed or
//! degenerate symbol is recorded and skipped, never fatal. Only an invalid
//! configuration aborts the whole screen.

use crate::config::ScreenConfig;
use anyhow::Result;
use bandscreen_core::data::{DataError, MarketDataProvider};
use bandscreen_core::{
    build_comparison_table, buy_signal_filter, compute_bands, ComparisonConfig, ComparisonRow,
    Instrument, ScreenError,
};
use chrono::NaiveDateTime;
use rayon::prelude::*;

/// Progress callback for multi-symbol screens.
pub trait ScreenProgress: Send + Sync {
    /// Called when a symbol's fetch starts.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol has been fetched and evaluated.
    fn on_complete(&self, symbol: &str, result: &Result<bool, DataError>);

    /// Called once the whole watchlist is done.
    fn on_batch_complete(&self, actionable: usize, quiet: usize, failed: usize);
}

/// Progress reporter that prints to stdout.
pub struct StdoutProgress;

impl ScreenProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] Screening {symbol}...", index + 1, total);
    }

    fn on_complete(&self, symbol: &str, result: &Result<bool, DataError>) {
        match result {
            Ok(true) => println!("  BUY: {symbol} breached within lookback"),
            Ok(false) => println!("  quiet: {symbol}"),
            Err(e) => println!("  FAIL: {symbol}: {e}"),
        }
    }

    fn on_batch_complete(&self, actionable: usize, quiet: usize, failed: usize) {
        println!(
            "\nScreen complete: {actionable} actionable, {quiet} quiet, {failed} failed"
        );
    }
}

/// No-op reporter for tests.
pub struct SilentProgress;

impl ScreenProgress for SilentProgress {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}
    fn on_complete(&self, _symbol: &str, _result: &Result<bool, DataError>) {}
    fn on_batch_complete(&self, _actionable: usize, _quiet: usize, _failed: usize) {}
}

/// Per-instrument screen verdict.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InstrumentVerdict {
    pub symbol: String,
    pub instrument_label: String,
    /// True iff a buy breach fired within the configured lookback.
    pub actionable: bool,
}

/// A symbol that could not be screened, with the reason.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScreenFailure {
    pub symbol: String,
    pub error: String,
}

/// Everything one screen run produces.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScreenOutcome {
    pub run_id: String,
    pub verdicts: Vec<InstrumentVerdict>,
    pub rows: Vec<ComparisonRow>,
    pub failures: Vec<ScreenFailure>,
}

impl ScreenOutcome {
    pub fn actionable(&self) -> impl Iterator<Item = &InstrumentVerdict> {
        self.verdicts.iter().filter(|v| v.actionable)
    }
}

fn comparison_config(config: &ScreenConfig) -> ComparisonConfig {
    // Inclusive day bounds: from-midnight through to-end-of-day.
    let clip_from: Option<NaiveDateTime> =
        config.clip_from.map(|d| d.and_hms_opt(0, 0, 0).unwrap());
    let clip_to: Option<NaiveDateTime> =
        config.clip_to.map(|d| d.and_hms_opt(23, 59, 59).unwrap());
    ComparisonConfig {
        bands: config.bands,
        side: config.side,
        period_days: config.period_days,
        clip_from,
        clip_to,
    }
}

/// Run the full screen: fetch once per symbol, evaluate, compare.
pub fn run_screen(
    provider: &dyn MarketDataProvider,
    config: &ScreenConfig,
    progress: &dyn ScreenProgress,
) -> Result<ScreenOutcome> {
    let total = config.watchlist.len();

    // Per-symbol work is independent; ScreenError (bad window/lookback) is a
    // configuration mistake and aborts, DataError is recorded and skipped.
    let screened: Vec<Result<Result<(Instrument, bool), ScreenFailure>, ScreenError>> = config
        .watchlist
        .par_iter()
        .enumerate()
        .map(|(index, symbol)| {
            progress.on_start(symbol, index, total);
            let fetched = match provider.fetch(symbol, config.interval) {
                Ok(fetched) => fetched,
                Err(e) => {
                    let error = e.to_string();
                    progress.on_complete(symbol, &Err(e));
                    return Ok(Err(ScreenFailure {
                        symbol: symbol.clone(),
                        error,
                    }));
                }
            };

            let instrument = Instrument::new(
                fetched.symbol,
                fetched.display_name,
                config.interval,
                fetched.series,
            );
            let annotated = compute_bands(instrument.series(), &config.bands)?;
            let actionable = buy_signal_filter(&annotated, config.side, config.lookback)?;
            progress.on_complete(symbol, &Ok(actionable));
            Ok(Ok((instrument, actionable)))
        })
        .collect();

    let mut instruments = Vec::new();
    let mut verdicts = Vec::new();
    let mut failures = Vec::new();
    for item in screened {
        match item? {
            Ok((instrument, actionable)) => {
                verdicts.push(InstrumentVerdict {
                    symbol: instrument.symbol().to_string(),
                    instrument_label: instrument.label(),
                    actionable,
                });
                instruments.push(instrument);
            }
            Err(failure) => failures.push(failure),
        }
    }

    let rows = build_comparison_table(&instruments, &comparison_config(config))?;

    let actionable = verdicts.iter().filter(|v| v.actionable).count();
    progress.on_batch_complete(actionable, verdicts.len() - actionable, failures.len());

    Ok(ScreenOutcome {
        run_id: config.run_id(),
        verdicts,
        rows,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandscreen_core::data::{DataError, FetchResult, SyntheticProvider};
    use bandscreen_core::{Interval, PriceObservation, PriceSeries, StrategyLabel};
    use chrono::NaiveDate;

    /// Provider with one crashing symbol, one flat symbol, and one failure.
    struct ScriptedProvider;

    fn daily_series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let observations = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceObservation {
                timestamp: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            })
            .collect();
        PriceSeries::new(observations).unwrap()
    }

    impl MarketDataProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn fetch(&self, symbol: &str, _interval: Interval) -> Result<FetchResult, DataError> {
            let series = match symbol {
                "CRASH" => {
                    // Breach on the second-to-last observation.
                    let mut closes = vec![100.0; 60];
                    closes[58] = 40.0;
                    daily_series(&closes)
                }
                "FLAT" => daily_series(&vec![100.0; 60]),
                _ => {
                    return Err(DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    })
                }
            };
            Ok(FetchResult {
                symbol: symbol.to_string(),
                display_name: symbol.to_string(),
                series,
            })
        }

        fn fetch_spot(&self, _symbol: &str) -> Result<f64, DataError> {
            Ok(100.0)
        }
    }

    fn scripted_config() -> ScreenConfig {
        ScreenConfig {
            watchlist: vec!["CRASH".into(), "FLAT".into(), "MISSING".into()],
            period_days: 30,
            lookback: 3,
            ..ScreenConfig::default()
        }
    }

    #[test]
    fn screen_partitions_verdicts_and_records_failures() {
        let outcome = run_screen(&ScriptedProvider, &scripted_config(), &SilentProgress).unwrap();

        assert_eq!(outcome.verdicts.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].symbol, "MISSING");

        let crash = outcome.verdicts.iter().find(|v| v.symbol == "CRASH").unwrap();
        let flat = outcome.verdicts.iter().find(|v| v.symbol == "FLAT").unwrap();
        assert!(crash.actionable);
        assert!(!flat.actionable);
        assert_eq!(outcome.actionable().count(), 1);
    }

    #[test]
    fn screen_builds_rows_for_surviving_instruments_only() {
        let outcome = run_screen(&ScriptedProvider, &scripted_config(), &SilentProgress).unwrap();

        assert!(outcome
            .rows
            .iter()
            .all(|r| r.instrument_label == "CRASH_1d" || r.instrument_label == "FLAT_1d"));
        let crash_strategy = outcome
            .rows
            .iter()
            .filter(|r| r.instrument_label == "CRASH_1d" && r.label == StrategyLabel::Strategy)
            .count();
        assert_eq!(crash_strategy, 1);
    }

    #[test]
    fn invalid_lookback_aborts_the_screen() {
        let mut config = scripted_config();
        config.lookback = 0;
        assert!(run_screen(&ScriptedProvider, &config, &SilentProgress).is_err());
    }

    #[test]
    fn synthetic_provider_screens_end_to_end() {
        let provider = SyntheticProvider::default();
        let config = ScreenConfig {
            watchlist: vec!["AAA".into(), "BBB".into()],
            ..ScreenConfig::default()
        };
        let outcome = run_screen(&provider, &config, &SilentProgress).unwrap();

        assert_eq!(outcome.verdicts.len(), 2);
        assert!(outcome.failures.is_empty());
        // 500 synthetic days, every one evaluated on the hold path.
        for label in ["AAA_1d", "BBB_1d"] {
            let hold = outcome
                .rows
                .iter()
                .filter(|r| r.instrument_label == label && r.label == StrategyLabel::Hold)
                .count();
            assert_eq!(hold, 500);
        }
    }
}
