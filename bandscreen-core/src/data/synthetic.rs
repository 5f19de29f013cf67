//! Synthetic market data: seeded random walks for offline runs and tests.

use super::provider::{DataError, FetchResult, MarketDataProvider};
use crate::domain::{Interval, PriceObservation, PriceSeries};
use chrono::{NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Geometric random-walk daily series: each close moves by a draw from
/// roughly +/- 2% around the previous close. Deterministic for a given seed.
pub fn random_walk_series(start: NaiveDateTime, days: usize, start_price: f64, seed: u64) -> PriceSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut close = start_price;
    let mut observations = Vec::with_capacity(days);

    for i in 0..days {
        let open = close;
        close = (open * (1.0 + rng.gen_range(-0.02..0.02))).max(0.01);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.005));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.005));
        observations.push(PriceObservation {
            timestamp: start + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: rng.gen_range(100_000.0..5_000_000.0),
        });
    }

    PriceSeries::new(observations).expect("generated timestamps are strictly increasing")
}

/// Offline provider: derives a per-symbol seed so distinct symbols get
/// distinct but reproducible walks.
pub struct SyntheticProvider {
    pub days: usize,
    pub seed: u64,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self { days: 500, seed: 42 }
    }
}

impl SyntheticProvider {
    fn symbol_seed(&self, symbol: &str) -> u64 {
        symbol
            .bytes()
            .fold(self.seed, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64))
    }

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 1, 3)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }
}

impl MarketDataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str, _interval: Interval) -> Result<FetchResult, DataError> {
        let series = random_walk_series(Self::start(), self.days, 100.0, self.symbol_seed(symbol));
        Ok(FetchResult {
            symbol: symbol.to_string(),
            display_name: symbol.to_string(),
            series,
        })
    }

    fn fetch_spot(&self, symbol: &str) -> Result<f64, DataError> {
        let fetched = self.fetch(symbol, Interval::OneDay)?;
        fetched
            .series
            .last()
            .map(|obs| obs.close)
            .ok_or_else(|| DataError::EmptyHistory {
                symbol: symbol.to_string(),
            })
    }
}
