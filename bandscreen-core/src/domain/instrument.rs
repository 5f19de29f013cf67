//! Instrument: identity plus its one owned price series.

use super::series::PriceSeries;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sampling interval of a price series, in the data provider's notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "60m")]
    SixtyMinutes,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1wk")]
    OneWeek,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::SixtyMinutes => "60m",
            Interval::OneDay => "1d",
            Interval::OneWeek => "1wk",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::OneDay
    }
}

/// A watchlist entry: symbol, human-readable name, sampling interval, and
/// exactly one price series.
///
/// Re-fetching replaces the series wholesale; it is never patched
/// incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    symbol: String,
    display_name: String,
    interval: Interval,
    series: PriceSeries,
}

impl Instrument {
    pub fn new(
        symbol: impl Into<String>,
        display_name: impl Into<String>,
        interval: Interval,
        series: PriceSeries,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: display_name.into(),
            interval,
            series,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    /// Swap in a freshly fetched series.
    pub fn replace_series(&mut self, series: PriceSeries) {
        self.series = series;
    }

    /// Grouping key used by the comparison table: name plus interval, so the
    /// same symbol sampled at two intervals compares as two instruments.
    pub fn label(&self) -> String {
        format!("{}_{}", self.display_name, self.interval)
    }
}
