//! Domain types: observations, series, instruments.

pub mod instrument;
pub mod observation;
pub mod series;

pub use instrument::{Instrument, Interval};
pub use observation::{PriceField, PriceObservation};
pub use series::PriceSeries;
