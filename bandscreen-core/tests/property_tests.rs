//! Property tests for the screening engine invariants.
//!
//! Uses proptest to verify:
//! 1. Band ordering: band_low <= moving_average <= band_high wherever defined
//! 2. Warm-up: no breach flag before the window boundary
//! 3. Idempotence: annotating the same raw series twice is identical
//! 4. Clamp: short histories never fail and evaluate every hold date

use chrono::NaiveDate;
use proptest::prelude::*;
use bandscreen_core::{
    compute_bands, return_on_hold, BandConfig, PriceField, PriceObservation, PriceSeries,
};

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

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..500.0_f64, 1..120)
}

fn arb_window() -> impl Strategy<Value = usize> {
    1..40_usize
}

fn arb_multiplier() -> impl Strategy<Value = f64> {
    0.5..4.0_f64
}

proptest! {
    /// Wherever the three band values are defined, they are ordered.
    #[test]
    fn bands_are_ordered(closes in arb_closes(), window in arb_window(), mult in arb_multiplier()) {
        let series = daily_series(&closes);
        let config = BandConfig { window, deviation_multiplier: mult, price: PriceField::Close };
        let annotated = compute_bands(&series, &config).unwrap();

        for i in 0..annotated.len() {
            let ma = annotated.moving_average()[i];
            if ma.is_nan() {
                prop_assert!(annotated.band_high()[i].is_nan());
                prop_assert!(annotated.band_low()[i].is_nan());
                continue;
            }
            prop_assert!(annotated.band_low()[i] <= ma);
            prop_assert!(ma <= annotated.band_high()[i]);
        }
    }

    /// Rows before the warm-up boundary never carry a breach flag.
    #[test]
    fn warm_up_rows_never_breach(closes in arb_closes(), window in arb_window()) {
        let series = daily_series(&closes);
        let config = BandConfig { window, deviation_multiplier: 2.0, price: PriceField::Close };
        let annotated = compute_bands(&series, &config).unwrap();

        for i in 0..window.saturating_sub(1).min(annotated.len()) {
            prop_assert!(!annotated.breaches(bandscreen_core::BreachSide::High)[i]);
            prop_assert!(!annotated.breaches(bandscreen_core::BreachSide::Low)[i]);
        }
    }

    /// Annotating the same raw input twice yields identical results.
    #[test]
    fn annotation_is_idempotent(closes in arb_closes(), window in arb_window()) {
        let series = daily_series(&closes);
        let config = BandConfig { window, deviation_multiplier: 2.0, price: PriceField::Close };
        let once = compute_bands(&series, &config).unwrap();
        let twice = compute_bands(&series, &config).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Any period against any history clamps and evaluates every hold date;
    /// ratios stay positive for positive prices.
    #[test]
    fn hold_returns_clamp_and_cover(closes in arb_closes(), period in 0u32..1000) {
        let series = daily_series(&closes);
        let returns = return_on_hold(&series, PriceField::Close, period);

        prop_assert_eq!(returns.len(), series.len());
        for ratio in returns.values() {
            prop_assert!(*ratio > 0.0);
        }
    }
}
