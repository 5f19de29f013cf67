//! Bandscreen Core: volatility-band screening engine.
//!
//! This crate contains the numerical heart of the screener:
//! - Domain types (observations, series, instruments)
//! - Band indicator: trailing moving average +/- deviation multiplier,
//!   with breach flags
//! - Forward-return engine with calendar-gap-tolerant horizon matching
//! - Buy-signal filter over a recent lookback window
//! - Hold-vs-strategy comparison table across instruments
//! - Market data adapters (Yahoo Finance, synthetic)
//!
//! All computation is synchronous and stateless across invocations: each
//! call takes an explicit input series and returns a new value.

pub mod bands;
pub mod compare;
pub mod data;
pub mod domain;
pub mod error;
pub mod returns;
pub mod signal;

pub use bands::{compute_bands, AnnotatedSeries, BandConfig, BreachSide};
pub use compare::{build_comparison_table, ComparisonConfig, ComparisonRow, StrategyLabel};
pub use domain::{Instrument, Interval, PriceField, PriceObservation, PriceSeries};
pub use error::ScreenError;
pub use returns::{return_on_hold, return_on_strategy, ReturnMap};
pub use signal::buy_signal_filter;
