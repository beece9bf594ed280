//! End-to-end portfolio analysis
//!
//! Runs the full pipeline for one portfolio:
//!
//! ```text
//! prices ─► log returns ─┬─► portfolio returns ─► VaR, histogram, summary
//!                        └─► correlation matrix
//! ```
//!
//! The analyzer holds only configuration; each call builds a fresh report.

use crate::aggregate::aggregate_portfolio_returns;
use crate::config::AnalyticsConfig;
use crate::correlation::CorrelationBuilder;
use crate::distribution::{ReturnHistogram, SeriesSummary};
use crate::error::Result;
use crate::provider::MarketDataProvider;
use crate::returns::compute_log_returns;
use crate::types::{CorrelationMatrix, PortfolioReturnSeries, PriceMatrix, ReturnMatrix, VarResult};
use crate::var::VarEstimator;
use crate::weights::{AllocationSlice, WeightVector};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Everything the chart layer displays for one portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    /// Allocation breakdown of the weights
    pub allocation: Vec<AllocationSlice>,

    /// Per-asset log-returns
    pub returns: ReturnMatrix,

    /// Weighted portfolio return per date
    pub portfolio_returns: PortfolioReturnSeries,

    /// Historical VaR of the portfolio returns
    pub var: VarResult,

    /// Pairwise correlation of asset returns
    pub correlation: CorrelationMatrix,

    /// Histogram of portfolio returns
    pub histogram: ReturnHistogram,

    /// Summary statistics of portfolio returns
    pub summary: SeriesSummary,
}

impl PortfolioReport {
    /// Serialize the report as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize the report as indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Portfolio analytics pipeline
#[derive(Debug, Clone, Default)]
pub struct PortfolioAnalyzer {
    config: AnalyticsConfig,
    var: VarEstimator,
    correlation: CorrelationBuilder,
}

impl PortfolioAnalyzer {
    /// Create a new analyzer with configuration
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            var: VarEstimator::new(config.var.clone()),
            correlation: CorrelationBuilder::new(config.correlation.clone()),
            config,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Analyze a portfolio from its closing prices and weights
    ///
    /// # Errors
    ///
    /// - [`AnalyticsError::Configuration`](crate::AnalyticsError::Configuration)
    ///   if a weighted asset has no price column
    /// - [`AnalyticsError::InsufficientData`](crate::AnalyticsError::InsufficientData)
    ///   if no date has a return for every weighted asset
    pub fn analyze(&self, prices: &PriceMatrix, weights: &WeightVector) -> Result<PortfolioReport> {
        info!(
            assets = prices.n_assets(),
            dates = prices.n_rows(),
            holdings = weights.len(),
            "Analyzing portfolio"
        );

        let returns = compute_log_returns(prices);
        let portfolio_returns = aggregate_portfolio_returns(&returns, weights)?;
        let var = self.var.estimate(&portfolio_returns)?;
        let correlation = self.correlation.build(&returns);
        let histogram =
            ReturnHistogram::from_series(&portfolio_returns, self.config.distribution.bin_width)?;
        let summary = SeriesSummary::from_series(&portfolio_returns)?;

        let undefined = correlation.undefined_pairs();
        if !undefined.is_empty() {
            warn!(
                pairs = undefined.len(),
                "Some asset correlations are undefined"
            );
        }

        info!(
            observations = var.observations,
            var_95 = var.var_95,
            var_99 = var.var_99,
            "Portfolio analysis complete"
        );

        Ok(PortfolioReport {
            allocation: weights.allocation(),
            returns,
            portfolio_returns,
            var,
            correlation,
            histogram,
            summary,
        })
    }

    /// Fetch prices for the weighted assets, then analyze
    ///
    /// Uses the configured lookback.
    pub fn analyze_with_provider<P>(&self, provider: &P, weights: &WeightVector) -> Result<PortfolioReport>
    where
        P: MarketDataProvider + ?Sized,
    {
        let prices = provider.fetch_close_prices(&weights.assets(), self.config.lookback)?;
        self.analyze(&prices, weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use chrono::{Duration, NaiveDate};

    fn prices() -> PriceMatrix {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..6).map(|i| start + Duration::days(i)).collect();
        PriceMatrix::from_columns(
            dates,
            vec![
                (
                    "AAPL".to_string(),
                    vec![Some(100.0), Some(101.0), Some(99.0), None, Some(102.0), Some(103.0)],
                ),
                (
                    "MSFT".to_string(),
                    vec![Some(200.0), Some(198.0), Some(201.0), Some(203.0), Some(202.0), Some(205.0)],
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_analyze_full_report() {
        let weights = WeightVector::new(vec![("AAPL", 0.5), ("MSFT", 0.5)]).unwrap();
        let report = PortfolioAnalyzer::default().analyze(&prices(), &weights).unwrap();

        assert_eq!(report.returns.n_rows(), 5);
        // AAPL's gap removes two return dates
        assert_eq!(report.portfolio_returns.len(), 3);
        assert_eq!(report.var.observations, 3);
        assert_eq!(report.summary.count, 3);
        assert_eq!(report.histogram.total_count(), 3);
        assert_eq!(report.correlation.dim(), 2);
        assert_eq!(report.allocation.len(), 2);

        let min = report.portfolio_returns.min().unwrap();
        let max = report.portfolio_returns.max().unwrap();
        assert!(report.var.var_95 >= min && report.var.var_95 <= max);
    }

    #[test]
    fn test_analyze_unknown_ticker() {
        let weights = WeightVector::new(vec![("XYZ", 1.0)]).unwrap();
        let result = PortfolioAnalyzer::default().analyze(&prices(), &weights);
        assert!(matches!(result, Err(AnalyticsError::Configuration(_))));
    }

    #[test]
    fn test_analyze_without_returns_is_insufficient_data() {
        let single_row = PriceMatrix::from_columns(
            vec![NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()],
            vec![("AAPL".to_string(), vec![Some(100.0)])],
        )
        .unwrap();
        let weights = WeightVector::new(vec![("AAPL", 1.0)]).unwrap();

        let result = PortfolioAnalyzer::default().analyze(&single_row, &weights);
        assert!(matches!(result, Err(AnalyticsError::InsufficientData(_))));
    }

    #[test]
    fn test_report_json_has_nulls_for_missing() {
        let weights = WeightVector::new(vec![("AAPL", 1.0)]).unwrap();
        let report = PortfolioAnalyzer::default().analyze(&prices(), &weights).unwrap();

        let json = report.to_json().unwrap();
        assert!(json.contains("null"));
        assert!(json.contains("var_95"));

        let parsed: PortfolioReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.portfolio_returns.dates(), report.portfolio_returns.dates());
        assert_eq!(parsed.correlation.assets(), report.correlation.assets());
    }
}
