//! Return distribution: histogram and summary statistics
//!
//! Feeds the distribution chart drawn alongside the VaR markers.

use crate::error::{AnalyticsError, Result};
use crate::types::PortfolioReturnSeries;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Default histogram bin width (0.5% log-return)
pub const DEFAULT_BIN_WIDTH: f64 = 0.005;

/// Smallest bin width a configuration may set
pub const MIN_BIN_WIDTH: f64 = 1e-6;

/// Most bins a single histogram may hold
pub const MAX_HISTOGRAM_BINS: usize = 100_000;

// Bin indices beyond 2^53 lose integer precision in f64
const MAX_BIN_INDEX: f64 = 9_007_199_254_740_992.0;

/// Distribution configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionConfig {
    /// Histogram bin width in return units
    #[serde(default = "default_bin_width")]
    pub bin_width: f64,
}

fn default_bin_width() -> f64 {
    DEFAULT_BIN_WIDTH
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            bin_width: default_bin_width(),
        }
    }
}

/// One histogram bin covering `[lower, upper)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,

    /// count / (n * bin_width), so bin areas sum to 1
    pub density: f64,
}

/// Fixed-width histogram of portfolio returns
///
/// Bin edges sit on integer multiples of the bin width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnHistogram {
    pub bin_width: f64,
    pub bins: Vec<HistogramBin>,
}

impl ReturnHistogram {
    /// Bin the returns of a series
    ///
    /// # Errors
    ///
    /// - [`AnalyticsError::InvalidInput`] if `bin_width` is not positive and
    ///   finite, or would need more than [`MAX_HISTOGRAM_BINS`] bins
    /// - [`AnalyticsError::InsufficientData`] if the series is empty
    pub fn from_series(series: &PortfolioReturnSeries, bin_width: f64) -> Result<Self> {
        if !bin_width.is_finite() || bin_width <= 0.0 {
            return Err(AnalyticsError::InvalidInput(format!(
                "Bin width must be positive, got {}",
                bin_width
            )));
        }

        let (min, max) = match (series.min(), series.max()) {
            (Some(min), Some(max)) => (min, max),
            _ => {
                return Err(AnalyticsError::InsufficientData(
                    "Cannot build a histogram from an empty series".to_string(),
                ))
            }
        };

        let (first, last) = ((min / bin_width).floor(), (max / bin_width).floor());
        if !(first.abs() <= MAX_BIN_INDEX && last.abs() <= MAX_BIN_INDEX) {
            return Err(AnalyticsError::InvalidInput(format!(
                "Bin width {} is too small for returns in [{}, {}]",
                bin_width, min, max
            )));
        }

        let (first, last) = (first as i64, last as i64);
        let n_bins = (last - first + 1) as usize;
        if n_bins > MAX_HISTOGRAM_BINS {
            return Err(AnalyticsError::InvalidInput(format!(
                "Bin width {} needs {} bins, limit is {}",
                bin_width, n_bins, MAX_HISTOGRAM_BINS
            )));
        }

        let mut counts = vec![0usize; n_bins];
        let last_idx = (n_bins - 1) as i64;
        for obs in series.iter() {
            let idx = ((obs.value / bin_width).floor() as i64 - first).clamp(0, last_idx);
            counts[idx as usize] += 1;
        }

        let n = series.len() as f64;
        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| {
                let lower = (first + i as i64) as f64 * bin_width;
                HistogramBin {
                    lower,
                    upper: lower + bin_width,
                    count,
                    density: count as f64 / (n * bin_width),
                }
            })
            .collect();

        Ok(Self { bin_width, bins })
    }

    /// Total number of observations across all bins
    pub fn total_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// Largest bin density, the height VaR marker lines are drawn to
    pub fn max_density(&self) -> f64 {
        self.bins.iter().map(|b| b.density).fold(0.0, f64::max)
    }
}

/// Summary statistics of a return series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub mean: f64,

    /// Sample standard deviation; `None` with a single observation
    pub std_dev: Option<f64>,

    pub min: f64,
    pub max: f64,
}

impl SeriesSummary {
    /// Summarize a non-empty series
    pub fn from_series(series: &PortfolioReturnSeries) -> Result<Self> {
        if series.is_empty() {
            return Err(AnalyticsError::InsufficientData(
                "Cannot summarize an empty series".to_string(),
            ));
        }

        let values = series.values();
        let std_dev = if values.len() > 1 {
            Some(values.iter().std_dev())
        } else {
            None
        };

        Ok(Self {
            count: values.len(),
            mean: values.iter().mean(),
            std_dev,
            min: Statistics::min(values.iter()),
            max: Statistics::max(values.iter()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series_of(values: &[f64]) -> PortfolioReturnSeries {
        let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        PortfolioReturnSeries::from_pairs(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (start + Duration::days(i as i64), *v)),
        )
        .unwrap()
    }

    #[test]
    fn test_histogram_counts() {
        let series = series_of(&[-0.012, -0.004, 0.001, 0.002, 0.0075]);
        let hist = ReturnHistogram::from_series(&series, 0.005).unwrap();

        // Bins from [-0.015, -0.010) to [0.005, 0.010)
        assert_eq!(hist.bins.len(), 5);
        assert_eq!(hist.total_count(), 5);
        assert_eq!(
            hist.bins.iter().map(|b| b.count).collect::<Vec<_>>(),
            vec![1, 0, 1, 2, 1]
        );

        let area: f64 = hist.bins.iter().map(|b| b.density * hist.bin_width).sum();
        assert!((area - 1.0).abs() < 1e-9);
        assert!((hist.max_density() - 2.0 / (5.0 * 0.005)).abs() < 1e-9);
    }

    #[test]
    fn test_histogram_single_value() {
        let hist = ReturnHistogram::from_series(&series_of(&[-0.02]), 0.005).unwrap();
        assert_eq!(hist.bins.len(), 1);
        assert_eq!(hist.bins[0].count, 1);
    }

    #[test]
    fn test_histogram_errors() {
        assert!(matches!(
            ReturnHistogram::from_series(&PortfolioReturnSeries::default(), 0.005),
            Err(AnalyticsError::InsufficientData(_))
        ));
        assert!(matches!(
            ReturnHistogram::from_series(&series_of(&[0.01]), 0.0),
            Err(AnalyticsError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_histogram_rejects_degenerate_bin_widths() {
        let series = series_of(&[-0.01, 0.002, 0.01]);

        // Bin indices overflow
        assert!(matches!(
            ReturnHistogram::from_series(&series, 1.0e-300),
            Err(AnalyticsError::InvalidInput(_))
        ));
        // Two hundred million bins
        assert!(matches!(
            ReturnHistogram::from_series(&series, 1.0e-10),
            Err(AnalyticsError::InvalidInput(_))
        ));
        assert!(ReturnHistogram::from_series(&series, MIN_BIN_WIDTH).is_ok());
    }

    #[test]
    fn test_summary() {
        let summary = SeriesSummary::from_series(&series_of(&[0.01, 0.03, -0.01])).unwrap();

        assert_eq!(summary.count, 3);
        assert!((summary.mean - 0.01).abs() < 1e-12);
        assert!((summary.std_dev.unwrap() - 0.02).abs() < 1e-12);
        assert_eq!(summary.min, -0.01);
        assert_eq!(summary.max, 0.03);

        let single = SeriesSummary::from_series(&series_of(&[0.01])).unwrap();
        assert_eq!(single.std_dev, None);
    }
}
