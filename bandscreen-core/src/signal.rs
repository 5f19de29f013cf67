//! Buy-signal filter: is the instrument currently actionable?

use crate::bands::{AnnotatedSeries, BreachSide};
use crate::error::ScreenError;

/// True iff a breach flag fired within the last `lookback` observations.
///
/// Used to partition a watchlist into "qualifies for deeper analysis" and
/// "skip". A lookback longer than the series inspects the whole series.
/// `lookback == 0` is a configuration mistake and is rejected.
pub fn buy_signal_filter(
    annotated: &AnnotatedSeries,
    side: BreachSide,
    lookback: usize,
) -> Result<bool, ScreenError> {
    if lookback == 0 {
        return Err(ScreenError::invalid("lookback", "must be >= 1"));
    }
    let flags = annotated.breaches(side);
    let start = flags.len().saturating_sub(lookback);
    Ok(flags[start..].iter().any(|&fired| fired))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::{compute_bands, BandConfig};
    use crate::domain::testing::make_series;
    use crate::domain::PriceSeries;

    fn annotate(closes: &[f64]) -> AnnotatedSeries {
        let config = BandConfig {
            window: 5,
            deviation_multiplier: 1.5,
            ..BandConfig::default()
        };
        compute_bands(&make_series(closes), &config).unwrap()
    }

    #[test]
    fn quiet_tail_is_not_actionable() {
        // Crash long ago, flat since: last 3 flags are all clear.
        let mut closes = vec![100.0; 20];
        closes[10] = 40.0;
        let annotated = annotate(&closes);

        assert!(!buy_signal_filter(&annotated, BreachSide::Low, 3).unwrap());
    }

    #[test]
    fn breach_within_lookback_is_actionable() {
        let mut closes = vec![100.0; 20];
        closes[18] = 40.0; // second-to-last observation
        let annotated = annotate(&closes);

        assert!(buy_signal_filter(&annotated, BreachSide::Low, 3).unwrap());
        // A lookback of 1 misses it.
        assert!(!buy_signal_filter(&annotated, BreachSide::Low, 1).unwrap());
    }

    #[test]
    fn lookback_longer_than_series_inspects_everything() {
        let mut closes = vec![100.0; 12];
        closes[6] = 40.0;
        let annotated = annotate(&closes);

        assert!(buy_signal_filter(&annotated, BreachSide::Low, 500).unwrap());
    }

    #[test]
    fn empty_series_is_never_actionable() {
        let annotated = compute_bands(&PriceSeries::empty(), &BandConfig::default()).unwrap();
        assert!(!buy_signal_filter(&annotated, BreachSide::Low, 3).unwrap());
    }

    #[test]
    fn zero_lookback_is_rejected() {
        let annotated = annotate(&[100.0; 10]);
        assert!(buy_signal_filter(&annotated, BreachSide::Low, 0).is_err());
    }
}
