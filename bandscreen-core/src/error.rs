//! Core error types.
//!
//! Data conditions (short history, missing future observation, empty series)
//! are never errors; they clamp, omit, or propagate as empty results. Only
//! configuration mistakes and adapter-contract violations surface here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreenError {
    /// A caller-supplied parameter is out of range (window 0, non-positive
    /// deviation multiplier, lookback 0). These indicate programmer or
    /// configuration mistakes, not data conditions.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The adapter handed over a series whose timestamps are not strictly
    /// increasing. Every downstream binary search assumes this ordering.
    #[error("series timestamps not strictly increasing at index {index}")]
    UnorderedTimestamps { index: usize },
}

impl ScreenError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
