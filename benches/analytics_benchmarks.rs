//! Benchmarks for the analytics pipeline
//!
//! Run with: cargo bench (add `--features parallel` to time rayon pairs)

use ag_portfolio::*;
use chrono::{Duration, NaiveDate};

const DAYS: usize = 1000;
const ASSETS: usize = 50;

fn synthetic_prices(days: usize, assets: usize) -> PriceMatrix {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let dates = (0..days).map(|i| start + Duration::days(i as i64)).collect();

    let columns = (0..assets)
        .map(|a| {
            let phase = a as f64 * 0.37;
            let prices = (0..days)
                .map(|i| {
                    // Sprinkle a gap every 97 days per asset
                    if (i + a) % 97 == 0 {
                        None
                    } else {
                        Some(100.0 + ((i as f64 * 0.01 + phase).sin() * 10.0) + i as f64 * 0.02)
                    }
                })
                .collect();
            (format!("ASSET{:02}", a), prices)
        })
        .collect();

    PriceMatrix::from_columns(dates, columns).unwrap()
}

fn main() {
    println!("=== Portfolio Analytics Performance Benchmarks ===\n");

    let prices = synthetic_prices(DAYS, ASSETS);
    let returns = compute_log_returns(&prices);
    let weights = WeightVector::new(
        prices
            .assets()
            .iter()
            .map(|a| (a.clone(), 1.0 / ASSETS as f64)),
    )
    .unwrap();

    benchmark_log_returns(&prices);
    benchmark_aggregation(&returns, &weights);
    benchmark_var(&returns, &weights);
    benchmark_correlation(&returns);

    println!("=== Benchmarks Complete ===");
}

fn benchmark_log_returns(prices: &PriceMatrix) {
    println!("## Log Returns ({} days x {} assets)", DAYS, ASSETS);

    let start = std::time::Instant::now();
    for _ in 0..100 {
        let _ = compute_log_returns(prices);
    }
    let elapsed = start.elapsed();
    println!("  Transform (100 iterations): {:?}", elapsed);
    println!("  Average: {:?}", elapsed / 100);
    println!();
}

fn benchmark_aggregation(returns: &ReturnMatrix, weights: &WeightVector) {
    println!("## Portfolio Aggregation");

    let start = std::time::Instant::now();
    for _ in 0..100 {
        let _ = aggregate_portfolio_returns(returns, weights);
    }
    let elapsed = start.elapsed();
    println!("  Aggregate (100 iterations): {:?}", elapsed);
    println!("  Average: {:?}", elapsed / 100);
    println!();
}

fn benchmark_var(returns: &ReturnMatrix, weights: &WeightVector) {
    println!("## Historical VaR");

    let series = aggregate_portfolio_returns(returns, weights).unwrap();
    println!("  Observations: {}", series.len());

    let start = std::time::Instant::now();
    for _ in 0..1000 {
        let _ = estimate_var(&series);
    }
    let elapsed = start.elapsed();
    println!("  VaR 95/99 (1000 iterations): {:?}", elapsed);
    println!("  Average: {:?}", elapsed / 1000);
    println!();
}

fn benchmark_correlation(returns: &ReturnMatrix) {
    println!("## Correlation Matrix ({} pairs)", ASSETS * (ASSETS - 1) / 2);

    let serial = CorrelationBuilder::default();
    let start = std::time::Instant::now();
    for _ in 0..10 {
        let _ = serial.build(returns);
    }
    let elapsed = start.elapsed();
    println!("  Serial (10 iterations): {:?}", elapsed);
    println!("  Average: {:?}", elapsed / 10);

    let parallel = CorrelationBuilder::new(CorrelationConfig {
        parallel: true,
        ..Default::default()
    });
    let start = std::time::Instant::now();
    for _ in 0..10 {
        let _ = parallel.build(returns);
    }
    let elapsed = start.elapsed();
    println!("  Parallel flag (10 iterations): {:?}", elapsed);
    println!("  Average: {:?}", elapsed / 10);
    println!();
}
