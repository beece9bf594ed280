//! Pairwise correlation of asset returns
//!
//! Pearson correlation for every pair of return columns, using only the
//! dates where both columns are present (pairwise-complete observations).
//! Each pair is computed once and mirrored. The diagonal is always 1.0.
//!
//! With the `parallel` feature and `CorrelationConfig::parallel` set, pairs
//! are computed on the rayon thread pool. Every pair reads only its two
//! input columns, so results match the serial path exactly.

use crate::types::{CorrelationMatrix, ReturnMatrix};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fewest overlapping observations for which a correlation is defined
pub const MIN_PAIR_OBSERVATIONS: usize = 2;

/// Spread, relative to the largest magnitude in a column, below which the
/// column counts as constant
const CONSTANT_TOLERANCE: f64 = 1e-10;

/// Correlation builder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Minimum overlapping observations per pair (raised to 2 if lower)
    #[serde(default = "default_min_overlap")]
    pub min_overlap: usize,

    /// Compute pairs in parallel (requires the `parallel` feature)
    #[serde(default)]
    pub parallel: bool,
}

fn default_min_overlap() -> usize {
    MIN_PAIR_OBSERVATIONS
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            min_overlap: default_min_overlap(),
            parallel: false,
        }
    }
}

/// Pearson correlation over the dates where both values are present
///
/// `None` with fewer than `min_overlap` overlapping observations or when
/// either side has zero variance over the overlap.
pub fn pairwise_pearson(x: &[Option<f64>], y: &[Option<f64>], min_overlap: usize) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();

    if pairs.len() < min_overlap.max(MIN_PAIR_OBSERVATIONS) {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    // Rounding in the mean leaves a constant column with a tiny nonzero variance
    if is_constant(var_x, pairs.iter().map(|(a, _)| *a), n)
        || is_constant(var_y, pairs.iter().map(|(_, b)| *b), n)
    {
        return None;
    }

    let corr = cov / (var_x.sqrt() * var_y.sqrt());
    corr.is_finite().then(|| corr.clamp(-1.0, 1.0))
}

fn is_constant(sum_sq_dev: f64, values: impl Iterator<Item = f64>, n: f64) -> bool {
    let scale = values.fold(0.0_f64, |acc, v| acc.max(v.abs()));
    sum_sq_dev <= n * (CONSTANT_TOLERANCE * scale).powi(2)
}

/// Correlation matrix builder
#[derive(Debug, Clone, Default)]
pub struct CorrelationBuilder {
    config: CorrelationConfig,
}

impl CorrelationBuilder {
    /// Create a new builder with configuration
    pub fn new(config: CorrelationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CorrelationConfig {
        &self.config
    }

    /// Build the correlation matrix of all return columns
    pub fn build(&self, returns: &ReturnMatrix) -> CorrelationMatrix {
        let n = returns.n_assets();
        let columns: Vec<Vec<Option<f64>>> = (0..n).map(|i| returns.column_at(i)).collect();

        // Upper triangle only, mirrored below
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();

        let results = self.compute_pairs(&columns, &pairs);

        let mut values = vec![vec![None; n]; n];
        for (i, row) in values.iter_mut().enumerate() {
            row[i] = Some(1.0);
        }
        for ((i, j), corr) in results {
            values[i][j] = corr;
            values[j][i] = corr;
        }

        let matrix = CorrelationMatrix::from_validated(returns.assets().to_vec(), values);

        debug!(
            assets = n,
            pairs = pairs.len(),
            undefined = matrix.undefined_pairs().len(),
            "Built correlation matrix"
        );

        matrix
    }

    #[cfg(feature = "parallel")]
    fn compute_pairs(
        &self,
        columns: &[Vec<Option<f64>>],
        pairs: &[(usize, usize)],
    ) -> Vec<((usize, usize), Option<f64>)> {
        use rayon::prelude::*;

        let min_overlap = self.config.min_overlap;
        if self.config.parallel {
            pairs
                .par_iter()
                .map(|&(i, j)| ((i, j), pairwise_pearson(&columns[i], &columns[j], min_overlap)))
                .collect()
        } else {
            serial_pairs(columns, pairs, min_overlap)
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn compute_pairs(
        &self,
        columns: &[Vec<Option<f64>>],
        pairs: &[(usize, usize)],
    ) -> Vec<((usize, usize), Option<f64>)> {
        if self.config.parallel {
            debug!("Parallel correlation requested without the `parallel` feature; computing serially");
        }
        serial_pairs(columns, pairs, self.config.min_overlap)
    }
}

fn serial_pairs(
    columns: &[Vec<Option<f64>>],
    pairs: &[(usize, usize)],
    min_overlap: usize,
) -> Vec<((usize, usize), Option<f64>)> {
    pairs
        .iter()
        .map(|&(i, j)| ((i, j), pairwise_pearson(&columns[i], &columns[j], min_overlap)))
        .collect()
}

/// Build the pairwise-complete correlation matrix with default settings
pub fn build_correlation_matrix(returns: &ReturnMatrix) -> CorrelationMatrix {
    CorrelationBuilder::default().build(returns)
}
