//! Serializable screen configuration.
//!
//! All defaults live here and are passed explicitly into the core entry
//! points; the core never reads configuration files itself, and nothing is
//! bound at definition time the way a shared default watchlist would be.

use anyhow::{Context, Result};
use bandscreen_core::{BandConfig, BreachSide, Interval};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unique identifier for a screen run (content-addressable hash).
pub type RunId = String;

/// Configuration for one watchlist screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScreenConfig {
    /// Symbols to screen.
    pub watchlist: Vec<String>,

    /// Sampling interval requested from the data provider.
    pub interval: Interval,

    /// Nominal holding period for the return comparison.
    pub period_days: u32,

    /// How many recent observations the buy-signal filter inspects.
    pub lookback: usize,

    /// Which band breach counts as the buy trigger.
    pub side: BreachSide,

    /// Band indicator parameters.
    pub bands: BandConfig,

    /// Optional shared date range the comparison clips to (inclusive).
    pub clip_from: Option<NaiveDate>,
    pub clip_to: Option<NaiveDate>,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            watchlist: Vec::new(),
            interval: Interval::OneDay,
            period_days: 365,
            lookback: 3,
            side: BreachSide::Low,
            bands: BandConfig::default(),
            clip_from: None,
            clip_to: None,
        }
    }
}

impl ScreenConfig {
    /// Load from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Deterministic hash ID for this configuration, used to name artifacts.
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("ScreenConfig serialization failed");
        let hash = blake3::hash(json.as_bytes());
        format!("{}", hash.to_hex())
    }
}
