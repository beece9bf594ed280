//! Portfolio report example
//!
//! Loads a portfolio table, serves simulated prices from memory and prints
//! every statistic the dashboard shows.
//!
//! Run with: cargo run --example portfolio_report

use ag_portfolio::*;
use chrono::{Duration, NaiveDate};

fn simulated_prices() -> Result<PriceMatrix> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let dates = (0..400).map(|i| start + Duration::days(i)).collect();

    let path = |base: f64, amp: f64, speed: f64, drift: f64| -> Vec<Option<f64>> {
        (0..400)
            .map(|i| {
                let t = i as f64;
                Some(base * (1.0 + (t * speed).sin() * amp + ((i * 7) % 13) as f64 * 0.001 + t * drift))
            })
            .collect()
    };

    PriceMatrix::from_columns(
        dates,
        vec![
            ("AAPL".to_string(), path(180.0, 0.04, 0.05, 0.0004)),
            ("MSFT".to_string(), path(370.0, 0.05, 0.045, 0.0003)),
            ("TLT".to_string(), path(95.0, -0.02, 0.05, -0.0001)),
            ("GLD".to_string(), path(190.0, 0.01, 0.11, 0.0002)),
        ],
    )
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    println!("=== Portfolio Report Example ===\n");

    // 1. Portfolio table as entered by the user (percent weights)
    let input = PortfolioInput::from_yaml(
        r#"
holdings:
  - ticker: AAPL
    weight: 35
  - ticker: MSFT
    weight: 30
  - ticker: TLT
    weight: 20
  - ticker: GLD
    weight: 15
  - ticker:
    weight: 5
"#,
    )?;
    let weights = input.to_weight_vector()?;

    println!("--- Allocation ---");
    for slice in weights.allocation() {
        println!("  {:<6} {:>6.1}%", slice.asset, slice.share * 100.0);
    }
    println!();

    // 2. Analyze over the last six months of prices
    let store = InMemoryPriceStore::new(simulated_prices()?);
    let config = AnalyticsConfig::from_yaml("lookback: 6mo\n")?;
    let report = PortfolioAnalyzer::new(config).analyze_with_provider(&store, &weights)?;

    println!("--- Portfolio Returns ---");
    println!("  Observations: {}", report.summary.count);
    println!("  Mean:         {:>8.4}%", report.summary.mean * 100.0);
    if let Some(std_dev) = report.summary.std_dev {
        println!("  Std dev:      {:>8.4}%", std_dev * 100.0);
    }
    println!("  Min / Max:    {:>8.4}% / {:.4}%", report.summary.min * 100.0, report.summary.max * 100.0);
    println!();

    println!("--- Value at Risk ---");
    println!("  VaR 95%: {:>8.4}%", report.var.var_95 * 100.0);
    println!("  VaR 99%: {:>8.4}%", report.var.var_99 * 100.0);
    println!();

    println!("--- Return Distribution ---");
    let peak = report.histogram.max_density();
    for bin in &report.histogram.bins {
        let bar = "#".repeat(((bin.density / peak) * 40.0).round() as usize);
        println!("  [{:>7.3}, {:>7.3})  {:>3}  {}", bin.lower, bin.upper, bin.count, bar);
    }
    println!();

    println!("--- Correlation Matrix ---");
    let assets = report.correlation.assets();
    print!("{:<6}", "");
    for asset in assets {
        print!("  {:>6}", asset);
    }
    println!();
    for (i, asset) in assets.iter().enumerate() {
        print!("{:<6}", asset);
        for j in 0..assets.len() {
            match report.correlation.at(i, j) {
                Some(value) => print!("  {:>6.3}", value),
                None => print!("  {:>6}", "-"),
            }
        }
        println!();
    }

    println!("\n=== Example Complete ===");

    Ok(())
}
