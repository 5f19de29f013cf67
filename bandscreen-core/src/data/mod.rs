//! Market data adapters: provider trait, Yahoo Finance, synthetic fallback.

pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use provider::{DataError, FetchResult, MarketDataProvider};
pub use synthetic::{random_walk_series, SyntheticProvider};
pub use yahoo::YahooProvider;
