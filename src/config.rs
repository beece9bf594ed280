//! Analytics configuration
//!
//! Typically loaded from a YAML or JSON document; every field has a default
//! so partial documents are accepted.
//!
//! ```yaml
//! lookback: 1y
//! var:
//!   min_observations: 1
//! correlation:
//!   min_overlap: 2
//!   parallel: false
//! distribution:
//!   bin_width: 0.005
//! ```

use crate::correlation::{CorrelationConfig, MIN_PAIR_OBSERVATIONS};
use crate::distribution::{DistributionConfig, MIN_BIN_WIDTH};
use crate::error::{AnalyticsError, Result};
use crate::provider::Lookback;
use crate::var::VarConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete analytics configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Price history requested from the market data provider
    #[serde(default)]
    pub lookback: Lookback,

    /// VaR estimator settings
    #[serde(default)]
    pub var: VarConfig,

    /// Correlation builder settings
    #[serde(default)]
    pub correlation: CorrelationConfig,

    /// Return histogram settings
    #[serde(default)]
    pub distribution: DistributionConfig,
}

impl AnalyticsConfig {
    /// Load configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AnalyticsConfig = serde_yaml::from_str(yaml)?;
        config.validated()
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AnalyticsConfig = serde_json::from_str(json)?;
        config.validated()
    }

    /// Load configuration from a file; `.json` files are read as JSON,
    /// anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&contents),
            _ => Self::from_yaml(&contents),
        }
    }

    /// Check value ranges, raising a too-small correlation overlap to 2
    pub fn validated(mut self) -> Result<Self> {
        let bin_width = self.distribution.bin_width;
        if !bin_width.is_finite() || bin_width < MIN_BIN_WIDTH {
            return Err(AnalyticsError::InvalidInput(format!(
                "distribution.bin_width must be at least {}, got {}",
                MIN_BIN_WIDTH, bin_width
            )));
        }

        self.var.min_observations = self.var.min_observations.max(1);
        self.correlation.min_overlap = self.correlation.min_overlap.max(MIN_PAIR_OBSERVATIONS);

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyticsConfig::default();

        assert_eq!(config.lookback, Lookback::Years(1));
        assert_eq!(config.var.min_observations, 1);
        assert_eq!(config.correlation.min_overlap, 2);
        assert!(!config.correlation.parallel);
        assert!((config.distribution.bin_width - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
lookback: 6mo
correlation:
  parallel: true
"#;

        let config = AnalyticsConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.lookback, Lookback::Months(6));
        assert!(config.correlation.parallel);
        assert_eq!(config.correlation.min_overlap, 2);
        assert_eq!(config.var, VarConfig::default());
    }

    #[test]
    fn test_json_config() {
        let json = r#"{
  "var": { "min_observations": 20 },
  "distribution": { "bin_width": 0.01 }
}"#;

        let config = AnalyticsConfig::from_json(json).unwrap();
        assert_eq!(config.var.min_observations, 20);
        assert!((config.distribution.bin_width - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_validation() {
        let config = AnalyticsConfig::from_yaml("correlation:\n  min_overlap: 0\nvar:\n  min_observations: 0\n").unwrap();
        assert_eq!(config.correlation.min_overlap, 2);
        assert_eq!(config.var.min_observations, 1);

        let invalid = AnalyticsConfig::from_yaml("distribution:\n  bin_width: -0.5\n");
        assert!(matches!(invalid, Err(AnalyticsError::InvalidInput(_))));

        let tiny = AnalyticsConfig::from_yaml("distribution:\n  bin_width: 1.0e-300\n");
        assert!(matches!(tiny, Err(AnalyticsError::InvalidInput(_))));

        let bad_lookback = AnalyticsConfig::from_yaml("lookback: 3w\n");
        assert!(matches!(bad_lookback, Err(AnalyticsError::Parse(_))));
    }

    #[test]
    fn test_serialization_yaml() {
        let yaml = serde_yaml::to_string(&AnalyticsConfig::default()).unwrap();
        assert!(yaml.contains("lookback: 1y"));
        assert!(yaml.contains("bin_width"));
    }
}
