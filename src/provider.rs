//! Market data provider contract
//!
//! The analytics core never fetches prices itself. A [`MarketDataProvider`]
//! supplies a [`PriceMatrix`] for a set of assets over a lookback period;
//! network access, retries and timeouts live behind that trait.

use crate::error::{AnalyticsError, Result};
use crate::types::PriceMatrix;
use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// History window ending at the latest available date
///
/// Parsed from period strings such as `"5d"`, `"6mo"`, `"1y"` and `"max"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Lookback {
    Days(u32),
    Months(u32),
    Years(u32),
    /// All available history
    Max,
}

impl Default for Lookback {
    fn default() -> Self {
        Lookback::Years(1)
    }
}

impl Lookback {
    /// First date inside the window ending at `end`
    ///
    /// `None` means the window is unbounded.
    pub fn start_date(&self, end: NaiveDate) -> Option<NaiveDate> {
        match *self {
            Lookback::Days(n) => end.checked_sub_signed(Duration::days(i64::from(n))),
            Lookback::Months(n) => end.checked_sub_months(Months::new(n)),
            Lookback::Years(n) => end.checked_sub_months(Months::new(n.saturating_mul(12))),
            Lookback::Max => None,
        }
    }
}

impl FromStr for Lookback {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        if s == "max" {
            return Ok(Lookback::Max);
        }

        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, unit) = s.split_at(split);

        let n: u32 = digits
            .parse()
            .map_err(|_| AnalyticsError::Parse(format!("Invalid lookback period: {:?}", s)))?;

        if n == 0 {
            return Err(AnalyticsError::Parse(format!(
                "Lookback period must be positive: {:?}",
                s
            )));
        }

        match unit {
            "d" => Ok(Lookback::Days(n)),
            "mo" => Ok(Lookback::Months(n)),
            "y" => Ok(Lookback::Years(n)),
            _ => Err(AnalyticsError::Parse(format!(
                "Unknown lookback unit in {:?} (expected d, mo, y or max)",
                s
            ))),
        }
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookback::Days(n) => write!(f, "{}d", n),
            Lookback::Months(n) => write!(f, "{}mo", n),
            Lookback::Years(n) => write!(f, "{}y", n),
            Lookback::Max => write!(f, "max"),
        }
    }
}

impl TryFrom<String> for Lookback {
    type Error = AnalyticsError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Lookback> for String {
    fn from(lookback: Lookback) -> Self {
        lookback.to_string()
    }
}

/// Source of historical closing prices
pub trait MarketDataProvider: Send + Sync {
    /// Closing prices for `assets` over `lookback`
    ///
    /// Columns appear in the order requested. Failures are reported as
    /// [`AnalyticsError::MarketData`].
    fn fetch_close_prices(&self, assets: &[String], lookback: Lookback) -> Result<PriceMatrix>;
}

/// Provider serving prices from a preloaded matrix
#[derive(Debug, Clone)]
pub struct InMemoryPriceStore {
    prices: PriceMatrix,
}

impl InMemoryPriceStore {
    pub fn new(prices: PriceMatrix) -> Self {
        Self { prices }
    }

    /// Load the stored matrix from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn prices(&self) -> &PriceMatrix {
        &self.prices
    }
}

impl MarketDataProvider for InMemoryPriceStore {
    fn fetch_close_prices(&self, assets: &[String], lookback: Lookback) -> Result<PriceMatrix> {
        let selected = self
            .prices
            .select(assets)
            .map_err(|e| AnalyticsError::MarketData(e.to_string()))?;

        let windowed = match selected.dates().last().and_then(|end| lookback.start_date(*end)) {
            Some(start) => selected.since(start),
            None => selected,
        };

        debug!(
            assets = assets.len(),
            rows = windowed.n_rows(),
            %lookback,
            "Served prices from memory"
        );

        Ok(windowed)
    }
}
