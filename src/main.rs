//! DCF Valuation CLI
//!
//! Values a single ticker from a market snapshot file, or from figures given
//! on the command line, and prints the projection, breakdown and sensitivity grid.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use dcf_valuation::analysis::{analyze, analyze_snapshot, ValuationReport};
use dcf_valuation::market::{loader::DEFAULT_SNAPSHOT_PATH, CsvMarketData, FcfSource, MarketSnapshot};
use dcf_valuation::{GrowthDecay, ModelParameters, TerminalGrowthPolicy};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DecayArg {
    Constant,
    Exponential,
}

/// Intrinsic value per share by discounted cash flow
#[derive(Parser, Debug)]
#[command(name = "dcf_valuation", version, about, long_about = None)]
struct Cli {
    /// Ticker symbol
    #[arg(default_value = "AAPL")]
    ticker: String,

    /// Market snapshot CSV
    #[arg(long, env = "DCF_SNAPSHOT", default_value = DEFAULT_SNAPSHOT_PATH)]
    data: PathBuf,

    /// JSON file with model parameters (flags below override it)
    #[arg(long, env = "DCF_CONFIG")]
    config: Option<PathBuf>,

    /// Base free cash flow (skips the snapshot file together with --price and --shares)
    #[arg(long, requires_all = ["price", "shares"])]
    base_fcf: Option<f64>,

    /// Current share price
    #[arg(long)]
    price: Option<f64>,

    /// Shares outstanding
    #[arg(long)]
    shares: Option<f64>,

    /// Equity beta for WACC
    #[arg(long)]
    beta: Option<f64>,

    /// Total debt (reported only)
    #[arg(long)]
    total_debt: Option<f64>,

    /// Cash and equivalents (reported only)
    #[arg(long)]
    cash: Option<f64>,

    /// Projection years
    #[arg(long)]
    years: Option<u32>,

    /// Initial growth rate (fraction, 0.05 = 5%)
    #[arg(long)]
    growth: Option<f64>,

    /// Terminal growth rate (fraction)
    #[arg(long)]
    terminal_growth: Option<f64>,

    /// Discount rate (fraction); WACC is computed when omitted
    #[arg(long)]
    discount: Option<f64>,

    /// Debt/equity ratio for WACC
    #[arg(long)]
    debt_to_equity: Option<f64>,

    /// Pre-tax cost of debt for WACC (fraction)
    #[arg(long)]
    cost_of_debt: Option<f64>,

    /// Growth path over the horizon
    #[arg(long, value_enum)]
    decay: Option<DecayArg>,

    /// Fail instead of clamping when terminal growth >= discount rate
    #[arg(long)]
    reject_terminal: bool,

    /// Skip the sensitivity grid
    #[arg(long)]
    no_sensitivity: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Write the projection schedule to a CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

impl Cli {
    fn parameters(&self) -> anyhow::Result<ModelParameters> {
        let mut params = match &self.config {
            Some(path) => ModelParameters::from_json_path(path)
                .with_context(|| format!("loading parameters from {}", path.display()))?,
            None => ModelParameters::default(),
        };

        if let Some(years) = self.years {
            params.projection_years = years;
        }
        if let Some(growth) = self.growth {
            params.growth_rate = growth;
        }
        if let Some(terminal) = self.terminal_growth {
            params.terminal_growth_rate = terminal;
        }
        if self.discount.is_some() {
            params.discount_rate = self.discount;
        }
        if let Some(de) = self.debt_to_equity {
            params.debt_to_equity = de;
        }
        if let Some(kd) = self.cost_of_debt {
            params.cost_of_debt = kd;
        }
        match self.decay {
            Some(DecayArg::Constant) => params.growth_decay = GrowthDecay::Constant,
            Some(DecayArg::Exponential) => params.growth_decay = GrowthDecay::exponential(),
            None => {}
        }
        if self.reject_terminal {
            params.terminal_growth_policy = TerminalGrowthPolicy::Reject;
        }

        Ok(params)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let params = cli.parameters()?;
    params.check_ranges();

    let ticker = cli.ticker.trim().to_uppercase();
    let with_sensitivity = !cli.no_sensitivity;

    let report = match (cli.base_fcf, cli.price, cli.shares) {
        (Some(fcf), Some(price), Some(shares)) => {
            let snapshot = MarketSnapshot::resolve(&ticker, price, shares, Some(fcf), cli.beta)?
                .with_balance_sheet(cli.total_debt, cli.cash);
            analyze_snapshot(snapshot, &params, with_sensitivity)?
        }
        _ => {
            let data = CsvMarketData::from_path(&cli.data)
                .with_context(|| format!("loading market snapshot {}", cli.data.display()))?;
            analyze(&data, &ticker, &params, with_sensitivity)?
        }
    };

    if let Some(path) = &cli.csv {
        write_schedule(path, &report)?;
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
        if let Some(path) = &cli.csv {
            println!("\nProjection schedule written to: {}", path.display());
        }
    }

    Ok(())
}

fn write_schedule(path: &Path, report: &ValuationReport) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in report.result.schedule() {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn print_report(report: &ValuationReport) {
    let snapshot = &report.snapshot;
    let input = &report.input;
    let result = &report.result;

    println!("DCF Valuation: {}", snapshot.ticker);
    println!("{}\n", "=".repeat(40));

    println!("Market Data:");
    println!("  Current price:      ${:.2}", snapshot.current_price);
    println!("  Shares outstanding: {:.0}", snapshot.shares_outstanding);
    println!("  Beta:               {:.2}", snapshot.beta);
    let fcf_note = match snapshot.fcf_source {
        FcfSource::Reported => "",
        FcfSource::MarketCapEstimate => " (estimated: 5% of market cap)",
    };
    println!("  Base FCF:           ${:.2}M{}", snapshot.base_fcf / 1e6, fcf_note);
    println!();

    if let Some(net_debt) = snapshot.net_debt() {
        println!("Financial Position:");
        println!("  Total debt:         {}", millions_or_na(snapshot.total_debt));
        println!("  Cash:               {}", millions_or_na(snapshot.cash));
        println!("  Net debt:           ${:.2}M", net_debt / 1e6);
        println!();
    }

    println!("Parameters:");
    println!("  Projection years:   {}", input.projection_years);
    println!("  Growth rate:        {:.2}%", input.growth_rate * 100.0);
    println!("  Terminal growth:    {:.2}%{}", result.terminal_growth_rate * 100.0,
        if result.terminal_growth_clamped { " (clamped)" } else { "" });
    println!("  Discount rate:      {:.2}%", result.discount_rate * 100.0);
    println!();

    println!("{:>5} {:>16} {:>10} {:>16}", "Year", "FCF", "DF", "PV");
    println!("{}", "-".repeat(50));
    for row in result.schedule() {
        println!("{:>5} {:>16.0} {:>10.6} {:>16.0}",
            row.year, row.cash_flow, row.discount_factor, row.present_value);
    }
    println!();

    let breakdown = &report.breakdown;
    println!("Value Breakdown:");
    println!("  PV of FCF:          ${:.2}M ({:.2}%)", breakdown.pv_cash_flows / 1e6, breakdown.cash_flows_pct);
    println!("  PV of terminal:     ${:.2}M ({:.2}%)", breakdown.pv_terminal / 1e6, breakdown.terminal_pct);
    println!("  Terminal value:     ${:.2}M", result.terminal_value / 1e6);
    println!("  Enterprise value:   ${:.2}M", result.enterprise_value / 1e6);
    println!();

    println!("Result:");
    println!("  Intrinsic value:    ${:.2}", result.intrinsic_value_per_share);
    println!("  vs. price:          ${:.2} ({:+.2}%)", report.price_gap.difference, report.price_gap.difference_pct);
    println!("  Recommendation:     {}", report.recommendation);

    if let Some(grid) = &report.sensitivity {
        println!("\nSensitivity (rows: growth, columns: discount rate):");
        print!("{:>8}", "");
        for label in grid.column_labels() {
            print!(" {:>12}", label);
        }
        println!();
        for (label, row) in grid.row_labels().iter().zip(&grid.cells) {
            print!("{:>8}", label);
            for cell in row {
                match cell.value() {
                    Some(v) => print!(" {:>12}", format!("${:.2}", v)),
                    None => print!(" {:>12}", "n/a"),
                }
            }
            println!();
        }
        if let (Some(min), Some(max)) = (grid.min_cell(), grid.max_cell()) {
            println!("  Range: ${:.2} .. ${:.2}", min.2, max.2);
        }
    }
}

fn millions_or_na(amount: Option<f64>) -> String {
    match amount {
        Some(v) => format!("${:.2}M", v / 1e6),
        None => "n/a".to_string(),
    }
}
