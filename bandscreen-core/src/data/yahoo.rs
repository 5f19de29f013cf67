//! Yahoo Finance data adapter.
//!
//! Fetches OHLCV history from Yahoo's v8 chart API with retry and backoff.
//! Yahoo has no official API and is subject to unannounced format changes;
//! the synthetic provider is the offline fallback.
//!
//! Timestamps arrive as UTC epochs together with the exchange's `gmtoffset`;
//! the adapter shifts them into exchange-local time and hands over naive
//! timestamps, so one series is normalized to one time zone.

use super::provider::{DataError, FetchResult, MarketDataProvider};
use crate::domain::{Interval, PriceObservation, PriceSeries};
use serde::Deserialize;
use std::time::Duration;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
    #[serde(rename = "shortName")]
    short_name: Option<String>,
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

/// Yahoo Finance provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    max_retries: u32,
    base_delay: Duration,
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooProvider {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }

    /// Largest range Yahoo serves for a given interval.
    fn default_range(interval: Interval) -> &'static str {
        match interval {
            Interval::SixtyMinutes => "2y",
            Interval::OneMinute => "60d",
            Interval::OneDay | Interval::OneWeek => "max",
        }
    }

    fn chart_url(symbol: &str, interval: &str, range: &str) -> String {
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?interval={interval}&range={range}"
        )
    }

    /// Parse a chart response into a normalized series.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<FetchResult, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        let display_name = data
            .meta
            .short_name
            .clone()
            .unwrap_or_else(|| symbol.to_string());
        let gmtoffset = data.meta.gmtoffset;

        let timestamps = data
            .timestamp
            .ok_or_else(|| DataError::EmptyHistory {
                symbol: symbol.to_string(),
            })?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut observations = Vec::with_capacity(timestamps.len());
        for (i, &epoch) in timestamps.iter().enumerate() {
            let timestamp = chrono::DateTime::from_timestamp(epoch + gmtoffset, 0)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {epoch}"))
                })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            // Holidays/non-trading slots come back as all-None rows.
            let (open, high, low, close) = match (open, high, low, close) {
                (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
                _ => continue,
            };

            observations.push(PriceObservation {
                timestamp,
                open,
                high,
                low,
                close,
                volume: volume.unwrap_or(0.0),
            });
        }

        if observations.is_empty() {
            return Err(DataError::EmptyHistory {
                symbol: symbol.to_string(),
            });
        }

        let series = PriceSeries::new(observations)
            .map_err(|e| DataError::ValidationError(e.to_string()))?;

        Ok(FetchResult {
            symbol: symbol.to_string(),
            display_name,
            series,
        })
    }

    /// Execute one chart request with retry and exponential backoff.
    fn fetch_chart(&self, symbol: &str, interval: &str, range: &str) -> Result<ChartResponse, DataError> {
        let url = Self::chart_url(symbol, interval, range);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                std::thread::sleep(delay);
            }

            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if !status.is_success() {
                        last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                        continue;
                    }

                    return resp.json().map_err(|e| {
                        DataError::ResponseFormatChanged(format!(
                            "failed to parse response for {symbol}: {e}"
                        ))
                    });
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other(format!("fetch failed for {symbol}"))))
    }
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo-finance"
    }

    fn fetch(&self, symbol: &str, interval: Interval) -> Result<FetchResult, DataError> {
        let range = Self::default_range(interval);
        let chart = self.fetch_chart(symbol, interval.as_str(), range)?;
        Self::parse_response(symbol, chart)
    }

    fn fetch_spot(&self, symbol: &str) -> Result<f64, DataError> {
        // One day of minute bars; the meta price is authoritative, the last
        // close is the fallback.
        let chart = self.fetch_chart(symbol, "1m", "1d")?;
        if let Some(data) = chart.chart.result.as_ref().and_then(|r| r.first()) {
            if let Some(price) = data.meta.regular_market_price {
                return Ok(price);
            }
        }
        let parsed = Self::parse_response(symbol, chart)?;
        parsed
            .series
            .last()
            .map(|obs| obs.close)
            .ok_or_else(|| DataError::EmptyHistory {
                symbol: symbol.to_string(),
            })
    }
}
