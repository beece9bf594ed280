//! Portfolio composition input
//!
//! A portfolio arrives as a table of `(ticker, weight-in-percent)` rows,
//! typed in by hand or uploaded as a document. Rows may be incomplete;
//! those are dropped before the table becomes a [`WeightVector`].

use crate::error::{AnalyticsError, Result};
use crate::weights::WeightVector;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// One row of the portfolio table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingRow {
    /// Ticker symbol, absent for a blank cell
    #[serde(default)]
    pub ticker: Option<String>,

    /// Weight in percent (25.0 means 25%), absent for a blank cell
    #[serde(default)]
    pub weight: Option<f64>,
}

impl HoldingRow {
    /// A complete row
    pub fn new(ticker: impl Into<String>, weight: f64) -> Self {
        Self {
            ticker: Some(ticker.into()),
            weight: Some(weight),
        }
    }
}

/// Portfolio table as supplied by the user
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub holdings: Vec<HoldingRow>,
}

impl PortfolioInput {
    pub fn new(holdings: Vec<HoldingRow>) -> Self {
        Self { holdings }
    }

    /// Parse a portfolio table from YAML
    ///
    /// # Example
    ///
    /// ```
    /// use ag_portfolio::PortfolioInput;
    ///
    /// let yaml = r#"
    /// holdings:
    ///   - ticker: AAPL
    ///     weight: 60
    ///   - ticker: MSFT
    ///     weight: 40
    /// "#;
    ///
    /// let weights = PortfolioInput::from_yaml(yaml).unwrap().to_weight_vector().unwrap();
    /// assert_eq!(weights.get("AAPL"), Some(0.6));
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a portfolio table from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert the table into fractional weights
    ///
    /// Rows missing a ticker or a weight are dropped; tickers are trimmed and
    /// percentages divided by 100.
    ///
    /// # Errors
    ///
    /// - [`AnalyticsError::Configuration`] for duplicate tickers or when no
    ///   complete row remains
    /// - [`AnalyticsError::InvalidInput`] for weights outside [0, 100]
    pub fn to_weight_vector(&self) -> Result<WeightVector> {
        let complete: Vec<(String, f64)> = self
            .holdings
            .iter()
            .filter_map(|row| {
                let ticker = row.ticker.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
                let weight = row.weight.filter(|w| !w.is_nan())?;
                Some((ticker.to_string(), weight))
            })
            .collect();

        debug!(
            rows = self.holdings.len(),
            complete = complete.len(),
            "Loaded portfolio table"
        );

        if complete.is_empty() {
            return Err(AnalyticsError::Configuration(
                "Portfolio has no complete (ticker, weight) rows".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (ticker, weight) in &complete {
            if !seen.insert(ticker.as_str()) {
                return Err(AnalyticsError::Configuration(format!(
                    "Ticker listed more than once: {}",
                    ticker
                )));
            }
            if !(0.0..=100.0).contains(weight) {
                return Err(AnalyticsError::InvalidInput(format!(
                    "Weight for {} must be within [0, 100] percent, got {}",
                    ticker, weight
                )));
            }
        }

        WeightVector::from_percentages(complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_rows_dropped() {
        let json = r#"{
  "holdings": [
    {"ticker": "AAPL", "weight": 25},
    {"ticker": "MSFT", "weight": null},
    {"ticker": null, "weight": 30},
    {"weight": 10},
    {"ticker": " TLT ", "weight": 15}
  ]
}"#;

        let weights = PortfolioInput::from_json(json).unwrap().to_weight_vector().unwrap();

        assert_eq!(weights.assets(), vec!["AAPL", "TLT"]);
        assert!((weights.get("AAPL").unwrap() - 0.25).abs() < 1e-12);
        assert!((weights.get("TLT").unwrap() - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_duplicate_ticker_rejected() {
        let input = PortfolioInput::new(vec![HoldingRow::new("AAPL", 50.0), HoldingRow::new("AAPL", 50.0)]);
        assert!(matches!(
            input.to_weight_vector(),
            Err(AnalyticsError::Configuration(_))
        ));
    }

    #[test]
    fn test_weight_out_of_range_rejected() {
        let input = PortfolioInput::new(vec![HoldingRow::new("AAPL", 120.0)]);
        assert!(matches!(
            input.to_weight_vector(),
            Err(AnalyticsError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_table_rejected() {
        let input = PortfolioInput::new(vec![HoldingRow {
            ticker: None,
            weight: Some(10.0),
        }]);
        assert!(matches!(
            input.to_weight_vector(),
            Err(AnalyticsError::Configuration(_))
        ));
    }

    #[test]
    fn test_yaml_parse_error() {
        let result = PortfolioInput::from_yaml("holdings: [ticker: AAPL");
        assert!(matches!(result, Err(AnalyticsError::Parse(_))));
    }
}
