//! Historical Value-at-Risk estimation
//!
//! VaR here is an empirical percentile of the portfolio return series:
//! - `var_95`: 5th percentile
//! - `var_99`: 1st percentile
//!
//! Percentiles use linear interpolation between order statistics: the rank
//! position is `p / 100 * (n - 1)` and the result interpolates between the
//! two nearest ranked values. Results depend only on the set of values,
//! never on date order.

use crate::error::{AnalyticsError, Result};
use crate::types::{PortfolioReturnSeries, VarResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Percentile reported as `var_95`
pub const VAR_95_PERCENTILE: f64 = 5.0;

/// Percentile reported as `var_99`
pub const VAR_99_PERCENTILE: f64 = 1.0;

/// VaR estimator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarConfig {
    /// Minimum number of observations required (at least 1)
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,
}

fn default_min_observations() -> usize {
    1
}

impl Default for VarConfig {
    fn default() -> Self {
        Self {
            min_observations: default_min_observations(),
        }
    }
}

/// Percentile of `values` by linear interpolation between order statistics
///
/// `values` need not be sorted. Returns `None` for an empty slice.
///
/// # Errors
///
/// - [`AnalyticsError::InvalidInput`] if `p` is outside [0, 100]
pub fn percentile(values: &[f64], p: f64) -> Result<Option<f64>> {
    validate_percentile(p)?;

    if values.is_empty() {
        return Ok(None);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    Ok(Some(percentile_of_sorted(&sorted, p)))
}

fn validate_percentile(p: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&p) {
        return Err(AnalyticsError::InvalidInput(format!(
            "Percentile must be within [0, 100], got {}",
            p
        )));
    }
    Ok(())
}

/// Interpolated percentile of a non-empty, ascending slice
fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * frac
    }
}

/// Historical VaR estimator
#[derive(Debug, Clone, Default)]
pub struct VarEstimator {
    config: VarConfig,
}

impl VarEstimator {
    /// Create a new estimator with configuration
    pub fn new(config: VarConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VarConfig {
        &self.config
    }

    /// Estimate `var_95` and `var_99` from a portfolio return series
    ///
    /// A single observation gives that value for both quantiles.
    ///
    /// # Errors
    ///
    /// - [`AnalyticsError::InsufficientData`] if the series is shorter than
    ///   `min_observations` (always for an empty series)
    pub fn estimate(&self, series: &PortfolioReturnSeries) -> Result<VarResult> {
        let sorted = self.sorted_values(series)?;

        let result = VarResult {
            var_95: percentile_of_sorted(&sorted, VAR_95_PERCENTILE),
            var_99: percentile_of_sorted(&sorted, VAR_99_PERCENTILE),
            observations: sorted.len(),
        };

        debug!(
            observations = result.observations,
            var_95 = result.var_95,
            var_99 = result.var_99,
            "Estimated historical VaR"
        );

        Ok(result)
    }

    /// Return quantile at an arbitrary percentile
    pub fn quantile(&self, series: &PortfolioReturnSeries, p: f64) -> Result<f64> {
        validate_percentile(p)?;
        let sorted = self.sorted_values(series)?;
        Ok(percentile_of_sorted(&sorted, p))
    }

    /// Expected shortfall (CVaR): mean of the returns at or below the
    /// `p`-th percentile
    pub fn expected_shortfall(&self, series: &PortfolioReturnSeries, p: f64) -> Result<f64> {
        validate_percentile(p)?;
        let sorted = self.sorted_values(series)?;
        let threshold = percentile_of_sorted(&sorted, p);

        // The minimum is always at or below the threshold, so the tail is never empty
        let tail: Vec<f64> = sorted.iter().copied().take_while(|r| *r <= threshold).collect();
        Ok(tail.iter().sum::<f64>() / tail.len() as f64)
    }

    fn sorted_values(&self, series: &PortfolioReturnSeries) -> Result<Vec<f64>> {
        let required = self.config.min_observations.max(1);

        if series.len() < required {
            return Err(AnalyticsError::InsufficientData(format!(
                "Need at least {} observations, got {}",
                required,
                series.len()
            )));
        }

        let mut sorted = series.values();
        sorted.sort_by(f64::total_cmp);
        Ok(sorted)
    }
}

/// Estimate `var_95` and `var_99` with the default configuration
pub fn estimate_var(series: &PortfolioReturnSeries) -> Result<VarResult> {
    VarEstimator::default().estimate(series)
}
