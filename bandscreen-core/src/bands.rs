//! Volatility bands: trailing moving average +/- standard deviation multiplier.
//!
//! For each observation with a full trailing window the engine computes:
//! - moving average: SMA(price, window), window inclusive of the current row
//! - band_high: ma + multiplier * stddev
//! - band_low:  ma - multiplier * stddev
//!
//! Uses sample stddev (divide by N - 1); a window of 1 has zero deviation.
//! Rows before the warm-up boundary carry NaN band values and unset breach
//! flags, so they can never read as a buy.

use crate::domain::{PriceField, PriceSeries};
use crate::error::ScreenError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Which band a price breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreachSide {
    /// Price closed above the upper band.
    High,
    /// Price closed below the lower band, the buy trigger.
    Low,
}

/// Band computation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    /// Trailing window length in observations. Must be >= 1.
    pub window: usize,
    /// Band half-width in standard deviations. Must be > 0.
    pub deviation_multiplier: f64,
    /// Price column the bands are computed over.
    pub price: PriceField,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            window: 20,
            deviation_multiplier: 2.0,
            price: PriceField::Close,
        }
    }
}

impl BandConfig {
    fn validate(&self) -> Result<(), ScreenError> {
        if self.window == 0 {
            return Err(ScreenError::invalid("window", "must be >= 1"));
        }
        if !(self.deviation_multiplier > 0.0) {
            return Err(ScreenError::invalid(
                "deviation_multiplier",
                format!("must be > 0, got {}", self.deviation_multiplier),
            ));
        }
        Ok(())
    }
}

/// A price series plus its aligned band columns and breach flags.
///
/// Invariant: wherever the three band values are defined,
/// `band_low <= moving_average <= band_high`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedSeries {
    series: PriceSeries,
    moving_average: Vec<f64>,
    band_high: Vec<f64>,
    band_low: Vec<f64>,
    high_breach: Vec<bool>,
    low_breach: Vec<bool>,
}

impl AnnotatedSeries {
    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// NaN before the warm-up boundary.
    pub fn moving_average(&self) -> &[f64] {
        &self.moving_average
    }

    pub fn band_high(&self) -> &[f64] {
        &self.band_high
    }

    pub fn band_low(&self) -> &[f64] {
        &self.band_low
    }

    pub fn breaches(&self, side: BreachSide) -> &[bool] {
        match side {
            BreachSide::High => &self.high_breach,
            BreachSide::Low => &self.low_breach,
        }
    }

    /// Indices of observations whose breach flag is set.
    pub fn breach_indices(&self, side: BreachSide) -> Vec<usize> {
        self.breaches(side)
            .iter()
            .enumerate()
            .filter_map(|(i, &fired)| fired.then_some(i))
            .collect()
    }

    /// Timestamps of observations whose breach flag is set.
    pub fn breach_timestamps(&self, side: BreachSide) -> Vec<NaiveDateTime> {
        self.breach_indices(side)
            .into_iter()
            .map(|i| self.series.observations()[i].timestamp)
            .collect()
    }

    /// New annotated series restricted to `[from, to]`, all columns sliced
    /// together so rows stay aligned with their band values.
    pub fn clip(&self, from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> AnnotatedSeries {
        let (start, end) = self.series.clip_bounds(from, to);
        AnnotatedSeries {
            series: self.series.clip(from, to),
            moving_average: self.moving_average[start..end].to_vec(),
            band_high: self.band_high[start..end].to_vec(),
            band_low: self.band_low[start..end].to_vec(),
            high_breach: self.high_breach[start..end].to_vec(),
            low_breach: self.low_breach[start..end].to_vec(),
        }
    }
}

/// Band columns compare bitwise so the NaN warm-up rows of two identical
/// computations count as equal.
impl PartialEq for AnnotatedSeries {
    fn eq(&self, other: &Self) -> bool {
        fn bitwise_eq(a: &[f64], b: &[f64]) -> bool {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
        }
        self.series == other.series
            && bitwise_eq(&self.moving_average, &other.moving_average)
            && bitwise_eq(&self.band_high, &other.band_high)
            && bitwise_eq(&self.band_low, &other.band_low)
            && self.high_breach == other.high_breach
            && self.low_breach == other.low_breach
    }
}

/// Annotate a series with volatility bands and breach flags.
///
/// Pure: the input series is copied into the result, never mutated, so the
/// raw and annotated views remain independently valid for the return engine's
/// two call sites. An empty series yields an empty annotated series. The only
/// failure mode is an invalid `BandConfig`.
pub fn compute_bands(
    series: &PriceSeries,
    config: &BandConfig,
) -> Result<AnnotatedSeries, ScreenError> {
    config.validate()?;

    let n = series.len();
    let window = config.window;
    let mut moving_average = vec![f64::NAN; n];
    let mut band_high = vec![f64::NAN; n];
    let mut band_low = vec![f64::NAN; n];
    let mut high_breach = vec![false; n];
    let mut low_breach = vec![false; n];

    for i in (window.saturating_sub(1))..n {
        let start = i + 1 - window;
        let prices: Vec<f64> = series.observations()[start..=i]
            .iter()
            .map(|o| o.price(config.price))
            .collect();

        if prices.iter().any(|p| p.is_nan()) {
            continue;
        }

        let mean = prices.iter().sum::<f64>() / window as f64;
        let stddev = if window > 1 {
            let variance = prices
                .iter()
                .map(|p| {
                    let diff = p - mean;
                    diff * diff
                })
                .sum::<f64>()
                / (window - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        let high = mean + config.deviation_multiplier * stddev;
        let low = mean - config.deviation_multiplier * stddev;
        moving_average[i] = mean;
        band_high[i] = high;
        band_low[i] = low;

        let price = prices[window - 1];
        high_breach[i] = price > high;
        low_breach[i] = price < low;
    }

    Ok(AnnotatedSeries {
        series: series.clone(),
        moving_average,
        band_high,
        band_low,
        high_breach,
        low_breach,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testing::{assert_approx, make_series, ts, DEFAULT_EPSILON};

    fn config(window: usize, mult: f64) -> BandConfig {
        BandConfig {
            window,
            deviation_multiplier: mult,
            price: PriceField::Close,
        }
    }

    #[test]
    fn moving_average_is_sma_of_trailing_window() {
        let series = make_series(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let annotated = compute_bands(&series, &config(3, 2.0)).unwrap();

        assert!(annotated.moving_average()[0].is_nan());
        assert!(annotated.moving_average()[1].is_nan());
        // mean(10,11,12) = 11, mean(11,12,13) = 12
        assert_approx(annotated.moving_average()[2], 11.0, DEFAULT_EPSILON);
        assert_approx(annotated.moving_average()[3], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bands_use_sample_stddev() {
        let series = make_series(&[10.0, 11.0, 12.0]);
        let annotated = compute_bands(&series, &config(3, 2.0)).unwrap();

        // sample stddev of {10,11,12} = sqrt(((−1)²+0²+1²)/2) = 1
        assert_approx(annotated.band_high()[2], 11.0 + 2.0, DEFAULT_EPSILON);
        assert_approx(annotated.band_low()[2], 11.0 - 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bands_are_symmetric_around_mean() {
        let series = make_series(&[10.0, 13.0, 9.0, 14.0, 12.0, 8.0]);
        let annotated = compute_bands(&series, &config(3, 2.0)).unwrap();

        for i in 2..annotated.len() {
            let up = annotated.band_high()[i] - annotated.moving_average()[i];
            let down = annotated.moving_average()[i] - annotated.band_low()[i];
            assert_approx(up, down, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn warm_up_rows_never_flag() {
        let series = make_series(&[10.0, 1.0, 100.0, 11.0, 12.0]);
        let annotated = compute_bands(&series, &config(4, 2.0)).unwrap();

        for i in 0..3 {
            assert!(!annotated.breaches(BreachSide::High)[i]);
            assert!(!annotated.breaches(BreachSide::Low)[i]);
            assert!(annotated.band_high()[i].is_nan());
        }
    }

    #[test]
    fn low_breach_fires_on_crash_below_band() {
        // The crash bar itself is part of the window, so it widens the band
        // it is measured against: mean 90, sample stddev 50/sqrt(5), lower
        // band 90 - 1.5 * 22.36 = 56.5. The 50 close is below it.
        let mut closes = vec![100.0; 10];
        closes.push(50.0);
        let series = make_series(&closes);
        let annotated = compute_bands(&series, &config(5, 1.5)).unwrap();

        let fired = annotated.breach_indices(BreachSide::Low);
        assert_eq!(fired, vec![10]);
        assert!(annotated.breach_indices(BreachSide::High).is_empty());
    }

    #[test]
    fn high_breach_fires_on_spike_above_band() {
        let mut closes = vec![100.0; 10];
        closes.push(200.0);
        let series = make_series(&closes);
        let annotated = compute_bands(&series, &config(5, 1.5)).unwrap();

        assert_eq!(annotated.breach_indices(BreachSide::High), vec![10]);
    }

    #[test]
    fn window_of_one_collapses_bands_onto_price() {
        let series = make_series(&[10.0, 11.0]);
        let annotated = compute_bands(&series, &config(1, 2.0)).unwrap();

        assert_approx(annotated.band_high()[0], 10.0, DEFAULT_EPSILON);
        assert_approx(annotated.band_low()[0], 10.0, DEFAULT_EPSILON);
        // price == band is not a strict breach
        assert!(!annotated.breaches(BreachSide::High)[0]);
        assert!(!annotated.breaches(BreachSide::Low)[0]);
    }

    #[test]
    fn empty_series_annotates_to_empty() {
        let annotated = compute_bands(&PriceSeries::empty(), &BandConfig::default()).unwrap();
        assert!(annotated.is_empty());
        assert!(annotated.breach_timestamps(BreachSide::Low).is_empty());
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let series = make_series(&[10.0, 11.0]);
        assert!(compute_bands(&series, &config(0, 2.0)).is_err());
        assert!(compute_bands(&series, &config(20, 0.0)).is_err());
        assert!(compute_bands(&series, &config(20, -1.0)).is_err());
    }

    #[test]
    fn recomputation_is_idempotent() {
        let series = make_series(&[10.0, 14.0, 9.0, 13.0, 11.0, 16.0, 8.0]);
        let once = compute_bands(&series, &config(3, 2.0)).unwrap();
        let twice = compute_bands(&series, &config(3, 2.0)).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn clip_keeps_columns_aligned() {
        let series = make_series(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let annotated = compute_bands(&series, &config(3, 2.0)).unwrap();
        let clipped = annotated.clip(Some(ts(2024, 1, 4)), None);

        assert_eq!(clipped.len(), 3);
        // Row 2 of the source (first defined band row) is row 0 after the clip.
        assert_approx(
            clipped.moving_average()[0],
            annotated.moving_average()[2],
            DEFAULT_EPSILON,
        );
    }
}
