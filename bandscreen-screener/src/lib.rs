//! Bandscreen Screener: watchlist orchestration, artifacts, configuration.
//!
//! Sits between the core engines and the CLI: loads a screen configuration,
//! runs the per-instrument fetch/annotate/verdict loop in parallel, builds
//! the comparison table, and writes the CSV/Markdown artifacts.

pub mod config;
pub mod report;
pub mod screener;

pub use config::{RunId, ScreenConfig};
pub use report::{render_summary_markdown, save_artifacts, summarize, write_comparison_csv};
pub use screener::{
    run_screen, InstrumentVerdict, ScreenFailure, ScreenOutcome, ScreenProgress, SilentProgress,
    StdoutProgress,
};
