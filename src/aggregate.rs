//! Weighted portfolio return aggregation
//!
//! Combines a [`ReturnMatrix`] with a [`WeightVector`] into one return per
//! date. Only the weighted assets take part; columns without a weight are
//! ignored. A date with any weighted return missing is dropped, never
//! re-weighted.

use crate::error::{AnalyticsError, Result};
use crate::types::{PortfolioReturnSeries, ReturnMatrix, ReturnObservation};
use crate::weights::WeightVector;
use tracing::{debug, warn};

/// Aggregate per-asset returns into a weighted portfolio return series
///
/// # Errors
///
/// - [`AnalyticsError::Configuration`] if a weighted asset has no return
///   column, or if the weight vector is empty
pub fn aggregate_portfolio_returns(
    returns: &ReturnMatrix,
    weights: &WeightVector,
) -> Result<PortfolioReturnSeries> {
    if weights.is_empty() {
        return Err(AnalyticsError::Configuration(
            "Weight vector contains no assets".to_string(),
        ));
    }

    // Resolve each weighted asset to its column before touching any row
    let columns = weights
        .iter()
        .map(|(asset, weight)| {
            returns
                .asset_index(asset)
                .map(|idx| (idx, weight))
                .ok_or_else(|| {
                    AnalyticsError::Configuration(format!(
                        "No return data for weighted asset: {}",
                        asset
                    ))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    if !weights.is_fully_allocated() {
        warn!(
            total_weight = weights.total(),
            "Weights do not sum to 1; portfolio exposure is scaled accordingly"
        );
    }

    let observations: Vec<ReturnObservation> = returns
        .dates()
        .iter()
        .zip(returns.rows())
        .filter_map(|(date, row)| {
            columns
                .iter()
                .map(|&(idx, weight)| row[idx].map(|r| r * weight))
                .sum::<Option<f64>>()
                .map(|value| ReturnObservation { date: *date, value })
        })
        .collect();

    debug!(
        rows = returns.n_rows(),
        kept = observations.len(),
        dropped = returns.n_rows() - observations.len(),
        "Aggregated portfolio returns"
    );

    Ok(PortfolioReturnSeries::from_validated(observations))
}
