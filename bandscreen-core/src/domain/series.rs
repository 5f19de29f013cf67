//! PriceSeries: an immutable, time-ordered sequence of observations.

use super::observation::{PriceField, PriceObservation};
use crate::error::ScreenError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Time-ordered OHLCV history for one instrument at one sampling interval.
///
/// Invariant: timestamps are unique and strictly increasing. The constructor
/// enforces this once; every lookup afterwards may binary-search. The series
/// is immutable from the engines' perspective; annotation and clipping
/// produce new values rather than mutating in place, so raw and annotated
/// views stay independently usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    observations: Vec<PriceObservation>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or duplicate timestamps.
    pub fn new(observations: Vec<PriceObservation>) -> Result<Self, ScreenError> {
        for (i, pair) in observations.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(ScreenError::UnorderedTimestamps { index: i + 1 });
            }
        }
        Ok(Self { observations })
    }

    /// An empty series, the valid degenerate input that produces empty
    /// outputs at every downstream stage.
    pub fn empty() -> Self {
        Self {
            observations: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    pub fn get(&self, index: usize) -> Option<&PriceObservation> {
        self.observations.get(index)
    }

    pub fn first(&self) -> Option<&PriceObservation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&PriceObservation> {
        self.observations.last()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.observations.iter().map(|o| o.timestamp)
    }

    /// Price of the observation at `index` in the given column.
    pub fn price(&self, index: usize, field: PriceField) -> f64 {
        self.observations[index].price(field)
    }

    /// Whole calendar days between the first and last observation.
    /// `None` for an empty series; 0 for a single observation.
    pub fn span_days(&self) -> Option<i64> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => Some((last.timestamp - first.timestamp).num_days()),
            _ => None,
        }
    }

    /// Index of the latest observation with timestamp <= `target`
    /// (the closest prior-or-equal approximation). `None` if every
    /// observation is after `target`.
    pub fn index_at_or_before(&self, target: NaiveDateTime) -> Option<usize> {
        let upper = self
            .observations
            .partition_point(|o| o.timestamp <= target);
        upper.checked_sub(1)
    }

    /// New series restricted to `[from, to]` (both inclusive, both optional).
    pub fn clip(&self, from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> PriceSeries {
        let (start, end) = self.clip_bounds(from, to);
        Self {
            observations: self.observations[start..end].to_vec(),
        }
    }

    /// Index range covered by `[from, to]`, shared with AnnotatedSeries so
    /// annotation columns clip identically to their source rows.
    pub(crate) fn clip_bounds(
        &self,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> (usize, usize) {
        let start = match from {
            Some(from) => self.observations.partition_point(|o| o.timestamp < from),
            None => 0,
        };
        let end = match to {
            Some(to) => self.observations.partition_point(|o| o.timestamp <= to),
            None => self.observations.len(),
        };
        (start, end.max(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testing::{make_series, ts};

    #[test]
    fn constructor_rejects_unordered_timestamps() {
        let mut obs = make_series(&[10.0, 11.0, 12.0]).observations().to_vec();
        obs.swap(0, 2);
        let err = PriceSeries::new(obs).unwrap_err();
        assert!(matches!(err, ScreenError::UnorderedTimestamps { index: 1 }));
    }

    #[test]
    fn constructor_rejects_duplicate_timestamps() {
        let mut obs = make_series(&[10.0, 11.0]).observations().to_vec();
        obs[1].timestamp = obs[0].timestamp;
        assert!(PriceSeries::new(obs).is_err());
    }

    #[test]
    fn span_days_handles_degenerate_lengths() {
        assert_eq!(PriceSeries::empty().span_days(), None);
        assert_eq!(make_series(&[10.0]).span_days(), Some(0));
        assert_eq!(make_series(&[10.0, 11.0, 12.0]).span_days(), Some(2));
    }

    #[test]
    fn index_at_or_before_matches_irregular_calendar() {
        // Daily series starting 2024-01-02.
        let series = make_series(&[10.0, 11.0, 12.0, 13.0]);

        // Exact hit.
        assert_eq!(series.index_at_or_before(ts(2024, 1, 3)), Some(1));
        // Between observations: falls back to the prior one.
        let mid = ts(2024, 1, 3) + chrono::Duration::hours(12);
        assert_eq!(series.index_at_or_before(mid), Some(1));
        // Past the end: last observation.
        assert_eq!(series.index_at_or_before(ts(2030, 1, 1)), Some(3));
        // Before the start: nothing qualifies.
        assert_eq!(series.index_at_or_before(ts(2020, 1, 1)), None);
    }

    #[test]
    fn clip_is_inclusive_on_both_ends() {
        let series = make_series(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let clipped = series.clip(Some(ts(2024, 1, 3)), Some(ts(2024, 1, 5)));
        assert_eq!(clipped.len(), 3);
        assert_eq!(clipped.first().unwrap().close, 11.0);
        assert_eq!(clipped.last().unwrap().close, 13.0);
        // Source untouched.
        assert_eq!(series.len(), 5);
    }

    #[test]
    fn clip_with_empty_window_yields_empty_series() {
        let series = make_series(&[10.0, 11.0]);
        let clipped = series.clip(Some(ts(2025, 1, 1)), Some(ts(2025, 2, 1)));
        assert!(clipped.is_empty());
    }
}
