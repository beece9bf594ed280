//! # ag-portfolio: Portfolio Return and Risk Analytics
//!
//! This library turns per-asset closing prices and portfolio weights into
//! the statistics a portfolio dashboard displays.
//!
//! ## Pipeline
//!
//! - **Return Transform**: prices → per-asset log-returns (`ln(prior / current)`)
//! - **Portfolio Aggregator**: log-returns + weights → weighted return series
//! - **VaR Estimator**: return series → 5th and 1st percentile (historical VaR)
//! - **Correlation Builder**: log-returns → pairwise-complete Pearson matrix
//!
//! Every stage is a pure function of its inputs. Missing cells are `None`
//! and flow downstream by exclusion; only unknown tickers and empty data
//! raise errors.
//!
//! ## Example Usage
//!
//! ```rust
//! use ag_portfolio::{
//!     aggregate_portfolio_returns, build_correlation_matrix, compute_log_returns, estimate_var,
//!     PriceMatrix, WeightVector,
//! };
//! use chrono::NaiveDate;
//!
//! let dates = (1..=4)
//!     .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
//!     .collect();
//! let prices = PriceMatrix::from_columns(
//!     dates,
//!     vec![
//!         ("AAPL".to_string(), vec![Some(100.0), Some(102.0), Some(101.0), Some(104.0)]),
//!         ("MSFT".to_string(), vec![Some(300.0), Some(297.0), Some(303.0), Some(306.0)]),
//!     ],
//! )
//! .unwrap();
//! let weights = WeightVector::from_percentages(vec![("AAPL", 60.0), ("MSFT", 40.0)]).unwrap();
//!
//! let returns = compute_log_returns(&prices);
//! let series = aggregate_portfolio_returns(&returns, &weights).unwrap();
//! let var = estimate_var(&series).unwrap();
//! let correlation = build_correlation_matrix(&returns);
//!
//! assert_eq!(series.len(), 3);
//! assert!(var.var_99 <= var.var_95);
//! assert_eq!(correlation.get("AAPL", "AAPL"), Some(1.0));
//! ```

pub mod aggregate;
pub mod config;
pub mod correlation;
pub mod distribution;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod provider;
pub mod returns;
pub mod types;
pub mod var;
pub mod weights;

pub use aggregate::aggregate_portfolio_returns;
pub use config::AnalyticsConfig;
pub use correlation::{build_correlation_matrix, CorrelationBuilder, CorrelationConfig};
pub use distribution::{DistributionConfig, HistogramBin, ReturnHistogram, SeriesSummary};
pub use error::{AnalyticsError, Result};
pub use input::{HoldingRow, PortfolioInput};
pub use pipeline::{PortfolioAnalyzer, PortfolioReport};
pub use provider::{InMemoryPriceStore, Lookback, MarketDataProvider};
pub use returns::compute_log_returns;
pub use types::{
    CorrelationMatrix, PortfolioReturnSeries, PriceMatrix, ReturnMatrix, ReturnObservation,
    VarResult,
};
pub use var::{estimate_var, percentile, VarConfig, VarEstimator};
pub use weights::{AllocationSlice, WeightVector};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing subscriber (for demos and tests)
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ag_portfolio=info"));

    // A subscriber may already be installed by another test
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .try_init();
}
