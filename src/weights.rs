//! Portfolio weight vectors and allocation breakdown

use crate::error::{AnalyticsError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tolerance used when reporting whether weights are fully allocated
pub const FULL_ALLOCATION_TOLERANCE: f64 = 1e-6;

/// Fractional weight per asset, in insertion order
///
/// Each weight lies in [0, 1]. Weights are not required to sum to 1:
/// under- or over-allocated portfolios are accepted as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IndexMap<String, f64>", into = "IndexMap<String, f64>")]
pub struct WeightVector {
    weights: IndexMap<String, f64>,
}

/// One slice of the allocation chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSlice {
    /// Asset identifier
    pub asset: String,

    /// Fractional weight as supplied
    pub weight: f64,

    /// Share of the total allocated weight (0.0 to 1.0)
    pub share: f64,
}

impl WeightVector {
    /// Build a weight vector from `(asset, weight)` pairs
    pub fn new<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut weights = IndexMap::new();

        for (asset, weight) in pairs {
            let asset = asset.into();

            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(AnalyticsError::InvalidInput(format!(
                    "Weight for {} must be within [0, 1], got {}",
                    asset, weight
                )));
            }

            if weights.insert(asset.clone(), weight).is_some() {
                return Err(AnalyticsError::InvalidInput(format!(
                    "Duplicate weight for asset: {}",
                    asset
                )));
            }
        }

        Ok(Self { weights })
    }

    /// Build a weight vector from percentage weights (25.0 means 25%)
    pub fn from_percentages<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(asset, pct)| (asset, pct / 100.0)))
    }

    /// Weight of one asset
    pub fn get(&self, asset: &str) -> Option<f64> {
        self.weights.get(asset).copied()
    }

    /// Asset identifiers in insertion order
    pub fn assets(&self) -> Vec<String> {
        self.weights.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(asset, weight)| (asset.as_str(), *weight))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Sum of all weights
    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Whether the weights sum to 1 within [`FULL_ALLOCATION_TOLERANCE`]
    pub fn is_fully_allocated(&self) -> bool {
        (self.total() - 1.0).abs() <= FULL_ALLOCATION_TOLERANCE
    }

    /// Allocation breakdown, each weight as a share of the total
    ///
    /// Shares are all zero when the total weight is zero.
    pub fn allocation(&self) -> Vec<AllocationSlice> {
        let total = self.total();

        self.weights
            .iter()
            .map(|(asset, &weight)| AllocationSlice {
                asset: asset.clone(),
                weight,
                share: if total > 0.0 { weight / total } else { 0.0 },
            })
            .collect()
    }
}

impl TryFrom<IndexMap<String, f64>> for WeightVector {
    type Error = AnalyticsError;

    fn try_from(map: IndexMap<String, f64>) -> Result<Self> {
        WeightVector::new(map)
    }
}

impl From<WeightVector> for IndexMap<String, f64> {
    fn from(weights: WeightVector) -> Self {
        weights.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_vector_preserves_order() {
        let weights = WeightVector::new(vec![("MSFT", 0.3), ("AAPL", 0.5), ("TLT", 0.2)]).unwrap();

        assert_eq!(weights.assets(), vec!["MSFT", "AAPL", "TLT"]);
        assert_eq!(weights.get("AAPL"), Some(0.5));
        assert!(weights.is_fully_allocated());
    }

    #[test]
    fn test_weight_out_of_range_rejected() {
        assert!(WeightVector::new(vec![("AAPL", 1.5)]).is_err());
        assert!(WeightVector::new(vec![("AAPL", -0.1)]).is_err());
        assert!(WeightVector::new(vec![("AAPL", f64::NAN)]).is_err());
    }

    #[test]
    fn test_duplicate_asset_rejected() {
        let result = WeightVector::new(vec![("AAPL", 0.5), ("AAPL", 0.5)]);
        assert!(matches!(result, Err(AnalyticsError::InvalidInput(_))));
    }

    #[test]
    fn test_from_percentages() {
        let weights = WeightVector::from_percentages(vec![("AAPL", 25.0)]).unwrap();

        assert!((weights.get("AAPL").unwrap() - 0.25).abs() < 1e-12);
        // Under-allocated portfolios are accepted as-is
        assert!(!weights.is_fully_allocated());
    }

    #[test]
    fn test_allocation_shares() {
        let weights = WeightVector::new(vec![("AAPL", 0.25), ("MSFT", 0.25)]).unwrap();
        let slices = weights.allocation();

        assert_eq!(slices.len(), 2);
        assert!((slices[0].share - 0.5).abs() < 1e-12);
        assert!((slices[0].weight - 0.25).abs() < 1e-12);

        let zero = WeightVector::new(vec![("AAPL", 0.0)]).unwrap();
        assert_eq!(zero.allocation()[0].share, 0.0);
    }

    #[test]
    fn test_deserialize_from_map() {
        let weights: WeightVector = serde_yaml::from_str("AAPL: 0.6\nMSFT: 0.4\n").unwrap();
        assert_eq!(weights.assets(), vec!["AAPL", "MSFT"]);

        let invalid = serde_yaml::from_str::<WeightVector>("AAPL: 60.0\n");
        assert!(invalid.is_err());
    }
}
