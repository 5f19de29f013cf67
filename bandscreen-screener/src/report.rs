//! Screen artifacts: comparison table CSV and a Markdown summary.
//!
//! The CSV is the long-form table itself; the Markdown summary gives the
//! box-plot-style quartiles per (instrument, strategy) group plus the list
//! of currently actionable candidates.

use crate::screener::ScreenOutcome;
use anyhow::{Context, Result};
use bandscreen_core::ComparisonRow;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

/// Write the long-form comparison table as CSV.
pub fn write_comparison_csv(path: &Path, rows: &[ComparisonRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create comparison CSV {}", path.display()))?;

    writer.write_record(["timestamp", "type", "roi", "instrument"])?;
    for row in rows {
        writer.write_record([
            row.timestamp.to_string(),
            row.label.to_string(),
            format!("{:.6}", row.return_ratio),
            row.instrument_label.clone(),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write comparison CSV {}", path.display()))?;
    Ok(())
}

/// Five-number summary of a group's return ratios.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Summarize return ratios per (instrument_label, strategy label).
///
/// Groups with no rows simply do not appear; keys are sorted, so output
/// ordering is deterministic regardless of how the screen was parallelized.
pub fn summarize(rows: &[ComparisonRow]) -> BTreeMap<(String, String), RatioSummary> {
    let mut groups: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.instrument_label.clone(), row.label.to_string()))
            .or_default()
            .push(row.return_ratio);
    }

    groups
        .into_iter()
        .map(|(key, mut ratios)| {
            ratios.sort_by(|a, b| a.total_cmp(b));
            let summary = RatioSummary {
                count: ratios.len(),
                min: ratios[0],
                q1: quantile(&ratios, 0.25),
                median: quantile(&ratios, 0.5),
                q3: quantile(&ratios, 0.75),
                max: ratios[ratios.len() - 1],
            };
            (key, summary)
        })
        .collect()
}

/// Linear-interpolated quantile of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = position - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

/// Render the Markdown summary for a screen run.
pub fn render_summary_markdown(outcome: &ScreenOutcome) -> String {
    let mut md = String::new();
    writeln!(md, "# Screen summary").unwrap();
    writeln!(md).unwrap();
    writeln!(md, "Run: `{}`", &outcome.run_id[..16.min(outcome.run_id.len())]).unwrap();
    writeln!(md).unwrap();

    writeln!(md, "## Actionable candidates").unwrap();
    writeln!(md).unwrap();
    let mut any = false;
    for verdict in outcome.actionable() {
        writeln!(md, "- **{}** ({})", verdict.symbol, verdict.instrument_label).unwrap();
        any = true;
    }
    if !any {
        writeln!(md, "_none_").unwrap();
    }
    writeln!(md).unwrap();

    writeln!(md, "## Return ratios (hold vs strategy)").unwrap();
    writeln!(md).unwrap();
    writeln!(md, "| Instrument | Type | n | min | q1 | median | q3 | max |").unwrap();
    writeln!(md, "|---|---|---:|---:|---:|---:|---:|---:|").unwrap();
    for ((instrument, label), s) in summarize(&outcome.rows) {
        writeln!(
            md,
            "| {instrument} | {label} | {} | {:.4} | {:.4} | {:.4} | {:.4} | {:.4} |",
            s.count, s.min, s.q1, s.median, s.q3, s.max
        )
        .unwrap();
    }

    if !outcome.failures.is_empty() {
        writeln!(md).unwrap();
        writeln!(md, "## Failures").unwrap();
        writeln!(md).unwrap();
        for failure in &outcome.failures {
            writeln!(md, "- {}: {}", failure.symbol, failure.error).unwrap();
        }
    }

    md
}

/// Write both artifacts into `output_dir`, named by run id.
/// Returns the two paths (CSV, Markdown).
pub fn save_artifacts(
    output_dir: &Path,
    outcome: &ScreenOutcome,
) -> Result<(std::path::PathBuf, std::path::PathBuf)> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir {}", output_dir.display()))?;

    let short_id = &outcome.run_id[..16.min(outcome.run_id.len())];
    let csv_path = output_dir.join(format!("comparison_{short_id}.csv"));
    let md_path = output_dir.join(format!("summary_{short_id}.md"));

    write_comparison_csv(&csv_path, &outcome.rows)?;
    std::fs::write(&md_path, render_summary_markdown(outcome))
        .with_context(|| format!("failed to write summary {}", md_path.display()))?;

    Ok((csv_path, md_path))
}
