//! Market data adapter trait and structured error types.
//!
//! The MarketDataProvider trait abstracts over data sources (Yahoo Finance,
//! synthetic generation) so the screener can swap implementations and run
//! offline in tests. The core engines never see these errors: their contract
//! begins once a PriceSeries exists.

use crate::domain::{Interval, PriceSeries};
use thiserror::Error;

/// Structured error types for data retrieval.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no history returned for symbol '{symbol}'")]
    EmptyHistory { symbol: String },

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    /// Human-readable name reported by the provider; falls back to the
    /// symbol when the provider has none.
    pub display_name: String,
    pub series: PriceSeries,
}

/// Trait for market data providers.
///
/// Implementations normalize timestamps to a single local time zone and hand
/// over a strictly ordered series; the screener fetches once per instrument
/// and passes the series into the core engines.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the full available history for a symbol at the given interval.
    fn fetch(&self, symbol: &str, interval: Interval) -> Result<FetchResult, DataError>;

    /// Current spot price, for the single-instrument detail view.
    fn fetch_spot(&self, symbol: &str) -> Result<f64, DataError>;
}
