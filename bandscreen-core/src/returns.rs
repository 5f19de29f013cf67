//! Forward-return engine.
//!
//! For a chosen subset of observations, computes the realized multiplicative
//! return over a fixed holding period: future price divided by price at the
//! observation. Calendars have gaps, so the "future" price is the closest
//! prior-or-equal observation to `timestamp + period`, the most recent
//! conservative proxy for "price one holding period later".
//!
//! A series shorter than the nominal period is not an error: the effective
//! period clamps to the series' actual span and the computation continues.

use crate::bands::{AnnotatedSeries, BreachSide};
use crate::domain::{PriceField, PriceSeries};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Realized return ratio keyed by the evaluated timestamp.
///
/// A timestamp is present only if a valid future observation was located;
/// otherwise it is silently omitted (never zero-filled).
pub type ReturnMap = BTreeMap<NaiveDateTime, f64>;

/// Return for holding from every observation in the series.
pub fn return_on_hold(series: &PriceSeries, price: PriceField, period_days: u32) -> ReturnMap {
    horizon_returns(series, price, period_days, 0..series.len())
}

/// Return for buying only where the breach flag fired.
pub fn return_on_strategy(
    annotated: &AnnotatedSeries,
    price: PriceField,
    side: BreachSide,
    period_days: u32,
) -> ReturnMap {
    horizon_returns(
        annotated.series(),
        price,
        period_days,
        annotated.breach_indices(side),
    )
}

/// Shared horizon-matching routine; hold and strategy differ only in which
/// indices they evaluate.
fn horizon_returns(
    series: &PriceSeries,
    price: PriceField,
    period_days: u32,
    indices: impl IntoIterator<Item = usize>,
) -> ReturnMap {
    let mut returns = ReturnMap::new();

    let span = match series.span_days() {
        Some(span) => span,
        None => return returns,
    };
    // Clamp, never error: short histories reduce the effective period to the
    // span actually covered. A single observation clamps to 0 days and
    // yields a self-comparison ratio of 1.0.
    let effective = span.min(i64::from(period_days));

    for i in indices {
        let obs = &series.observations()[i];
        let target = obs.timestamp + chrono::Duration::days(effective);
        // The observation itself is <= target, so in practice a match always
        // exists; the guard covers any future change to the clamp rule.
        if let Some(future) = series.index_at_or_before(target) {
            let ratio = series.price(future, price) / obs.price(price);
            returns.insert(obs.timestamp, ratio);
        }
    }

    returns
}
