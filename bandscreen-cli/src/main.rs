//! Bandscreen CLI: volatility-band watchlist screener.
//!
//! Commands:
//! - `screen`: screen a watchlist, write comparison CSV + Markdown summary
//! - `detail`: annotated tail and current spot price for one instrument

use anyhow::{bail, Result};
use bandscreen_core::data::{MarketDataProvider, SyntheticProvider, YahooProvider};
use bandscreen_core::{buy_signal_filter, compute_bands, BreachSide, Interval};
use bandscreen_screener::{run_screen, save_artifacts, ScreenConfig, SilentProgress, StdoutProgress};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "bandscreen",
    about = "Bandscreen CLI: volatility-band buy-signal screener"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen a watchlist and write comparison artifacts.
    Screen {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbols to screen (appended to the config's watchlist).
        symbols: Vec<String>,

        /// Holding period in days.
        #[arg(long)]
        period: Option<u32>,

        /// Band window in observations.
        #[arg(long)]
        window: Option<usize>,

        /// Buy-signal lookback in observations.
        #[arg(long)]
        lookback: Option<usize>,

        /// Clip the comparison to dates on or after this day (YYYY-MM-DD).
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Clip the comparison to dates on or before this day (YYYY-MM-DD).
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Use deterministic synthetic data instead of Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Print the outcome as JSON instead of writing artifacts.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show the annotated tail and current price for one instrument.
    Detail {
        /// Symbol to inspect.
        symbol: String,

        /// Sampling interval: 1m, 60m, 1d, 1wk.
        #[arg(long, default_value = "1d")]
        interval: String,

        /// Band window in observations.
        #[arg(long, default_value_t = 20)]
        window: usize,

        /// Band half-width in standard deviations.
        #[arg(long, default_value_t = 2.0)]
        deviation: f64,

        /// How many recent observations to print.
        #[arg(long, default_value_t = 10)]
        tail: usize,

        /// Use deterministic synthetic data instead of Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Screen {
            config,
            symbols,
            period,
            window,
            lookback,
            from,
            to,
            synthetic,
            output_dir,
            json,
        } => run_screen_cmd(
            config, symbols, period, window, lookback, from, to, synthetic, output_dir, json,
        ),
        Commands::Detail {
            symbol,
            interval,
            window,
            deviation,
            tail,
            synthetic,
        } => run_detail_cmd(symbol, &interval, window, deviation, tail, synthetic),
    }
}

fn make_provider(synthetic: bool) -> Box<dyn MarketDataProvider> {
    if synthetic {
        Box::new(SyntheticProvider::default())
    } else {
        Box::new(YahooProvider::new())
    }
}

fn parse_interval(s: &str) -> Result<Interval> {
    match s {
        "1m" => Ok(Interval::OneMinute),
        "60m" => Ok(Interval::SixtyMinutes),
        "1d" => Ok(Interval::OneDay),
        "1wk" => Ok(Interval::OneWeek),
        other => bail!("unknown interval '{other}' (expected 1m, 60m, 1d, or 1wk)"),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_screen_cmd(
    config_path: Option<PathBuf>,
    symbols: Vec<String>,
    period: Option<u32>,
    window: Option<usize>,
    lookback: Option<usize>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    synthetic: bool,
    output_dir: PathBuf,
    json: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => ScreenConfig::from_toml_file(&path)?,
        None => ScreenConfig::default(),
    };
    config.watchlist.extend(symbols);
    if config.watchlist.is_empty() {
        bail!("no symbols to screen: pass symbols or a config file with a watchlist");
    }
    if let Some(period) = period {
        config.period_days = period;
    }
    if let Some(window) = window {
        config.bands.window = window;
    }
    if let Some(lookback) = lookback {
        config.lookback = lookback;
    }
    if from.is_some() {
        config.clip_from = from;
    }
    if to.is_some() {
        config.clip_to = to;
    }

    let provider = make_provider(synthetic);
    let outcome = if json {
        run_screen(provider.as_ref(), &config, &SilentProgress)?
    } else {
        run_screen(provider.as_ref(), &config, &StdoutProgress)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let (csv_path, md_path) = save_artifacts(&output_dir, &outcome)?;
    println!("Comparison table: {}", csv_path.display());
    println!("Summary:          {}", md_path.display());
    Ok(())
}

fn run_detail_cmd(
    symbol: String,
    interval: &str,
    window: usize,
    deviation: f64,
    tail: usize,
    synthetic: bool,
) -> Result<()> {
    let interval = parse_interval(interval)?;
    let provider = make_provider(synthetic);

    let fetched = provider.fetch(&symbol, interval)?;
    let spot = provider.fetch_spot(&symbol)?;

    let bands = bandscreen_core::BandConfig {
        window,
        deviation_multiplier: deviation,
        ..Default::default()
    };
    let annotated = compute_bands(&fetched.series, &bands)?;
    let actionable = buy_signal_filter(&annotated, BreachSide::Low, 3)?;

    println!("{} ({symbol}, {interval})", fetched.display_name);
    println!("spot: {spot:.2}  actionable: {actionable}");
    println!();
    println!("{:<20} {:>10} {:>10} {:>10} {:>10}  signal", "timestamp", "close", "ma", "high", "low");

    let n = annotated.len();
    let start = n.saturating_sub(tail);
    let observations = annotated.series().observations();
    for i in start..n {
        let flag = if annotated.breaches(BreachSide::Low)[i] {
            "BUY"
        } else if annotated.breaches(BreachSide::High)[i] {
            "high"
        } else {
            ""
        };
        println!(
            "{:<20} {:>10.2} {:>10.2} {:>10.2} {:>10.2}  {flag}",
            observations[i].timestamp.to_string(),
            observations[i].close,
            annotated.moving_average()[i],
            annotated.band_high()[i],
            annotated.band_low()[i],
        );
    }

    Ok(())
}
