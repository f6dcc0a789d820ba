//! Value every ticker in a market snapshot file
//!
//! Runs the valuations in parallel and writes one summary row per ticker.
//! Tickers that cannot be valued are reported with their error instead of a value.

use anyhow::Context;
use clap::Parser;
use dcf_valuation::analysis::analyze;
use dcf_valuation::market::{loader::DEFAULT_SNAPSHOT_PATH, CachedProvider, CsvMarketData, MarketDataProvider};
use dcf_valuation::ModelParameters;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "value_universe", about = "Batch DCF valuation of a snapshot file")]
struct Args {
    /// Market snapshot CSV
    #[arg(long, env = "DCF_SNAPSHOT", default_value = DEFAULT_SNAPSHOT_PATH)]
    data: PathBuf,

    /// JSON file with model parameters
    #[arg(long, env = "DCF_CONFIG")]
    config: Option<PathBuf>,

    /// Output CSV
    #[arg(long, default_value = "universe_valuation.csv")]
    output: PathBuf,
}

/// One output row per ticker
#[derive(Debug, Serialize)]
struct SummaryRow {
    ticker: String,
    current_price: Option<f64>,
    base_fcf: Option<f64>,
    net_debt: Option<f64>,
    discount_rate: Option<f64>,
    enterprise_value: Option<f64>,
    intrinsic_value: Option<f64>,
    difference_pct: Option<f64>,
    recommendation: String,
    error: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let start = Instant::now();

    let params = match &args.config {
        Some(path) => ModelParameters::from_json_path(path)
            .with_context(|| format!("loading parameters from {}", path.display()))?,
        None => ModelParameters::default(),
    };
    params.check_ranges();

    println!("Loading snapshots from {}...", args.data.display());
    let data = CsvMarketData::from_path(&args.data)
        .with_context(|| format!("loading market snapshot {}", args.data.display()))?;
    let tickers = data.tickers();
    println!("Loaded {} tickers in {:?}", tickers.len(), start.elapsed());

    let provider = CachedProvider::new(data);

    println!("Running valuations...");
    let valuation_start = Instant::now();

    let rows: Vec<SummaryRow> = tickers
        .par_iter()
        .map(|ticker| match analyze(&provider, ticker, &params, false) {
            Ok(report) => SummaryRow {
                ticker: ticker.clone(),
                current_price: Some(report.snapshot.current_price),
                base_fcf: Some(report.snapshot.base_fcf),
                net_debt: report.snapshot.net_debt(),
                discount_rate: Some(report.result.discount_rate),
                enterprise_value: Some(report.result.enterprise_value),
                intrinsic_value: Some(report.result.intrinsic_value_per_share),
                difference_pct: Some(report.price_gap.difference_pct),
                recommendation: report.recommendation.to_string(),
                error: None,
            },
            Err(e) => SummaryRow {
                ticker: ticker.clone(),
                current_price: provider.fetch(ticker).map(|s| s.current_price).ok(),
                base_fcf: None,
                net_debt: None,
                discount_rate: None,
                enterprise_value: None,
                intrinsic_value: None,
                difference_pct: None,
                recommendation: String::new(),
                error: Some(e.to_string()),
            },
        })
        .collect();

    println!("Valuations complete in {:?}", valuation_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("Output written to {}", args.output.display());

    let failed = rows.iter().filter(|r| r.error.is_some()).count();
    println!("\nUniverse Summary:");
    println!("  Valued: {}", rows.len() - failed);
    println!("  Failed: {}", failed);
    for label in ["STRONG BUY", "BUY", "HOLD", "SELL"] {
        let count = rows.iter().filter(|r| r.recommendation == label).count();
        println!("  {:<10} {}", label, count);
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
