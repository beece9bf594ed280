//! Log-return transform
//!
//! Converts a [`PriceMatrix`] into a [`ReturnMatrix`]. Each cell at date `t`
//! is `ln(price[t-1] / price[t])`, the prior-over-current ratio. A rising
//! price therefore yields a negative return; every downstream statistic
//! (portfolio series, VaR, histogram) inherits this sign.

use crate::types::{PriceMatrix, ReturnMatrix};
use tracing::debug;

/// Log of the prior-over-current price ratio
///
/// Missing, non-positive or non-finite prices, and ratios whose log is not
/// finite, all give `None`.
pub fn log_return(prior: Option<f64>, current: Option<f64>) -> Option<f64> {
    let prior = prior.filter(|p| p.is_finite() && *p > 0.0)?;
    let current = current.filter(|p| p.is_finite() && *p > 0.0)?;

    let value = (prior / current).ln();
    value.is_finite().then_some(value)
}

/// Compute per-asset log-returns from closing prices
///
/// The first date has no predecessor and is dropped. Fewer than two price
/// rows, or no assets, give an empty matrix.
pub fn compute_log_returns(prices: &PriceMatrix) -> ReturnMatrix {
    if prices.n_rows() < 2 || prices.n_assets() == 0 {
        debug!(
            rows = prices.n_rows(),
            assets = prices.n_assets(),
            "Not enough prices for a return row"
        );
        return ReturnMatrix::empty(prices.assets().to_vec());
    }

    let rows: Vec<Vec<Option<f64>>> = prices
        .rows()
        .windows(2)
        .map(|pair| {
            pair[0]
                .iter()
                .zip(pair[1].iter())
                .map(|(&prior, &current)| log_return(prior, current))
                .collect()
        })
        .collect();

    let returns = ReturnMatrix::from_validated(
        prices.dates()[1..].to_vec(),
        prices.assets().to_vec(),
        rows,
    );

    debug!(
        rows = returns.n_rows(),
        assets = returns.n_assets(),
        missing = returns.missing_count(),
        "Computed log returns"
    );

    returns
}
