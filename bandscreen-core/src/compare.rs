//! Comparison aggregator: hold vs strategy returns across instruments.
//!
//! Reshapes each instrument's two return maps into one long-form table, one
//! row per (timestamp, label) pair, tagged with the instrument's label. The
//! table is the unit the presentation layer consumes; downstream statistics
//! group by `instrument_label` and nothing may depend on row order beyond
//! that grouping.

use crate::bands::{compute_bands, BandConfig, BreachSide};
use crate::domain::{Instrument, PriceField};
use crate::error::ScreenError;
use crate::returns::{return_on_hold, return_on_strategy, ReturnMap};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which return stream a comparison row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyLabel {
    /// Baseline: held continuously, return measured from every date.
    Hold,
    /// Return measured only from dates where the buy breach fired.
    Strategy,
}

impl fmt::Display for StrategyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyLabel::Hold => f.write_str("Hold"),
            StrategyLabel::Strategy => f.write_str("Strategy"),
        }
    }
}

/// One long-form observation of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub timestamp: NaiveDateTime,
    pub label: StrategyLabel,
    pub return_ratio: f64,
    pub instrument_label: String,
}

/// Parameters for one comparison run, shared across all instruments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    pub bands: BandConfig,
    /// Which breach side counts as the buy trigger.
    pub side: BreachSide,
    /// Nominal holding period; clamped per instrument to the clipped span.
    pub period_days: u32,
    /// Optional shared date range, applied before return computation so the
    /// period clamp sees the clipped span.
    pub clip_from: Option<NaiveDateTime>,
    pub clip_to: Option<NaiveDateTime>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            bands: BandConfig::default(),
            side: BreachSide::Low,
            period_days: 365,
            clip_from: None,
            clip_to: None,
        }
    }
}

/// Build the cross-instrument comparison table.
///
/// Instruments are processed independently; a degenerate one (empty series,
/// no valid returns) contributes zero rows without aborting the batch. Rows
/// keep per-instrument grouping: all of one instrument's hold rows, then its
/// strategy rows, then the next instrument.
pub fn build_comparison_table(
    instruments: &[Instrument],
    config: &ComparisonConfig,
) -> Result<Vec<ComparisonRow>, ScreenError> {
    let mut rows = Vec::new();

    for instrument in instruments {
        let annotated = compute_bands(instrument.series(), &config.bands)?;

        // Clip before computing returns: both views see the same span.
        let raw = instrument.series().clip(config.clip_from, config.clip_to);
        let annotated = annotated.clip(config.clip_from, config.clip_to);

        let hold = return_on_hold(&raw, config.bands.price, config.period_days);
        let strategy =
            return_on_strategy(&annotated, config.bands.price, config.side, config.period_days);

        let label = instrument.label();
        push_rows(&mut rows, &hold, StrategyLabel::Hold, &label);
        push_rows(&mut rows, &strategy, StrategyLabel::Strategy, &label);
    }

    Ok(rows)
}

fn push_rows(
    rows: &mut Vec<ComparisonRow>,
    returns: &ReturnMap,
    label: StrategyLabel,
    instrument_label: &str,
) {
    rows.extend(returns.iter().map(|(&timestamp, &return_ratio)| ComparisonRow {
        timestamp,
        label,
        return_ratio,
        instrument_label: instrument_label.to_string(),
    }));
}

/// Convenience view over the table for a single instrument and label.
pub fn ratios_for<'a>(
    rows: &'a [ComparisonRow],
    instrument_label: &'a str,
    label: StrategyLabel,
) -> impl Iterator<Item = f64> + 'a {
    rows.iter()
        .filter(move |r| r.label == label && r.instrument_label == instrument_label)
        .map(|r| r.return_ratio)
}
