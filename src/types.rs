//! Value types flowing through the analytics pipeline
//!
//! Every stage builds a fresh value from its inputs and never mutates a
//! structure it did not create. Missing cells are `None`; they serialize as
//! `null` so the chart layer can render them as blanks.

use crate::error::{AnalyticsError, Result};
use chrono::NaiveDate;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Serialized shape shared by [`PriceMatrix`] and [`ReturnMatrix`]
#[derive(Debug, Clone, Deserialize)]
struct RawFrame {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

/// Check the date axis, asset axis and row widths of a dated matrix
fn validate_frame(dates: &[NaiveDate], assets: &[String], rows: &[Vec<Option<f64>>]) -> Result<()> {
    if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
        return Err(AnalyticsError::InvalidInput(format!(
            "Dates must be strictly increasing: {} is followed by {}",
            pair[0], pair[1]
        )));
    }

    let mut seen = HashSet::with_capacity(assets.len());
    for asset in assets {
        if !seen.insert(asset.as_str()) {
            return Err(AnalyticsError::InvalidInput(format!(
                "Duplicate asset identifier: {}",
                asset
            )));
        }
    }

    if rows.len() != dates.len() {
        return Err(AnalyticsError::InvalidInput(format!(
            "Expected {} rows (one per date), got {}",
            dates.len(),
            rows.len()
        )));
    }

    for (date, row) in dates.iter().zip(rows) {
        if row.len() != assets.len() {
            return Err(AnalyticsError::InvalidInput(format!(
                "Row for {} has {} cells, expected {}",
                date,
                row.len(),
                assets.len()
            )));
        }
    }

    Ok(())
}

/// Non-finite cells carry no information and are stored as missing
fn clean_rows(rows: Vec<Vec<Option<f64>>>) -> Vec<Vec<Option<f64>>> {
    rows.into_iter()
        .map(|row| row.into_iter().map(|cell| cell.filter(|v| v.is_finite())).collect())
        .collect()
}

fn position(assets: &[String], asset: &str) -> Option<usize> {
    assets.iter().position(|a| a == asset)
}

/// Closing prices indexed by trading date (rows) and asset (columns)
///
/// Cells are closing prices or `None` for non-trading days and data gaps.
/// Dates are strictly increasing and asset identifiers are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFrame")]
pub struct PriceMatrix {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl PriceMatrix {
    /// Build a price matrix from row-major cells
    ///
    /// `rows[i][j]` is the close of `assets[j]` on `dates[i]`.
    pub fn new(
        dates: Vec<NaiveDate>,
        assets: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        validate_frame(&dates, &assets, &rows)?;
        Ok(Self {
            dates,
            assets,
            rows: clean_rows(rows),
        })
    }

    /// Build a price matrix from one price column per asset
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self> {
        for (asset, column) in &columns {
            if column.len() != dates.len() {
                return Err(AnalyticsError::InvalidInput(format!(
                    "Asset {} has {} prices, expected {}",
                    asset,
                    column.len(),
                    dates.len()
                )));
            }
        }

        let assets: Vec<String> = columns.iter().map(|(asset, _)| asset.clone()).collect();
        let rows = (0..dates.len())
            .map(|i| columns.iter().map(|(_, column)| column[i]).collect())
            .collect();

        Self::new(dates, assets, rows)
    }

    /// Trading dates, oldest first
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Asset identifiers in column order
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Row-major cells
    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.dates.len()
    }

    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    /// True when there is no date or no asset
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.assets.is_empty()
    }

    /// Column index of an asset
    pub fn asset_index(&self, asset: &str) -> Option<usize> {
        position(&self.assets, asset)
    }

    /// Price cell at (row, column)
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Price column of one asset
    pub fn column(&self, asset: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.asset_index(asset)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// New matrix restricted to the given assets, in the given order
    pub fn select(&self, assets: &[String]) -> Result<PriceMatrix> {
        let indices = assets
            .iter()
            .map(|asset| {
                self.asset_index(asset).ok_or_else(|| {
                    AnalyticsError::Configuration(format!("No price column for asset: {}", asset))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i]).collect())
            .collect();

        PriceMatrix::new(self.dates.clone(), assets.to_vec(), rows)
    }

    /// New matrix holding only the rows dated on or after `start`
    pub fn since(&self, start: NaiveDate) -> PriceMatrix {
        let first = self.dates.partition_point(|d| *d < start);
        PriceMatrix {
            dates: self.dates[first..].to_vec(),
            assets: self.assets.clone(),
            rows: self.rows[first..].to_vec(),
        }
    }
}

impl TryFrom<RawFrame> for PriceMatrix {
    type Error = AnalyticsError;

    fn try_from(raw: RawFrame) -> Result<Self> {
        PriceMatrix::new(raw.dates, raw.assets, raw.rows)
    }
}

/// Per-asset log-returns
///
/// Same columns as the [`PriceMatrix`] it came from, minus its first date.
/// Cells are finite log-returns or `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFrame")]
pub struct ReturnMatrix {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl ReturnMatrix {
    /// Build a return matrix directly from row-major cells
    pub fn new(
        dates: Vec<NaiveDate>,
        assets: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        validate_frame(&dates, &assets, &rows)?;
        Ok(Self {
            dates,
            assets,
            rows: clean_rows(rows),
        })
    }

    /// Assemble from parts already validated by a [`PriceMatrix`]
    pub(crate) fn from_validated(
        dates: Vec<NaiveDate>,
        assets: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Self {
        Self {
            dates,
            assets,
            rows,
        }
    }

    /// An empty matrix keeping the asset axis
    pub(crate) fn empty(assets: Vec<String>) -> Self {
        Self {
            dates: Vec::new(),
            assets,
            rows: Vec::new(),
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.dates.len()
    }

    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    /// True when no return row exists
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn asset_index(&self, asset: &str) -> Option<usize> {
        position(&self.assets, asset)
    }

    /// Return cell at (row, column)
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Return column of one asset
    pub fn column(&self, asset: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.asset_index(asset)?;
        Some(self.column_at(idx))
    }

    pub(crate) fn column_at(&self, idx: usize) -> Vec<Option<f64>> {
        self.rows.iter().map(|row| row[idx]).collect()
    }

    /// Number of missing cells across the whole matrix
    pub fn missing_count(&self) -> usize {
        self.rows.iter().flatten().filter(|cell| cell.is_none()).count()
    }
}

impl TryFrom<RawFrame> for ReturnMatrix {
    type Error = AnalyticsError;

    fn try_from(raw: RawFrame) -> Result<Self> {
        ReturnMatrix::new(raw.dates, raw.assets, raw.rows)
    }
}

/// One dated portfolio return
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnObservation {
    pub date: NaiveDate,
    pub value: f64,
}

/// Weighted portfolio return per date
///
/// Only dates where every constituent return was present appear here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<ReturnObservation>", into = "Vec<ReturnObservation>")]
pub struct PortfolioReturnSeries {
    observations: Vec<ReturnObservation>,
}

impl PortfolioReturnSeries {
    /// Build a series from dated values
    ///
    /// Dates must be strictly increasing and every value finite.
    pub fn new(observations: Vec<ReturnObservation>) -> Result<Self> {
        if let Some(pair) = observations.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(AnalyticsError::InvalidInput(format!(
                "Series dates must be strictly increasing: {} is followed by {}",
                pair[0].date, pair[1].date
            )));
        }

        if let Some(obs) = observations.iter().find(|o| !o.value.is_finite()) {
            return Err(AnalyticsError::InvalidInput(format!(
                "Non-finite return on {}",
                obs.date
            )));
        }

        Ok(Self { observations })
    }

    /// Build a series from `(date, value)` pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, value)| ReturnObservation { date, value })
                .collect(),
        )
    }

    pub(crate) fn from_validated(observations: Vec<ReturnObservation>) -> Self {
        Self { observations }
    }

    pub fn observations(&self) -> &[ReturnObservation] {
        &self.observations
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReturnObservation> {
        self.observations.iter()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Smallest return, `None` for an empty series
    pub fn min(&self) -> Option<f64> {
        self.observations.iter().map(|o| o.value).reduce(f64::min)
    }

    /// Largest return, `None` for an empty series
    pub fn max(&self) -> Option<f64> {
        self.observations.iter().map(|o| o.value).reduce(f64::max)
    }
}

impl TryFrom<Vec<ReturnObservation>> for PortfolioReturnSeries {
    type Error = AnalyticsError;

    fn try_from(observations: Vec<ReturnObservation>) -> Result<Self> {
        PortfolioReturnSeries::new(observations)
    }
}

impl From<PortfolioReturnSeries> for Vec<ReturnObservation> {
    fn from(series: PortfolioReturnSeries) -> Self {
        series.observations
    }
}

/// Historical Value-at-Risk of a portfolio return series
///
/// Values are return quantiles in the same units as the series; negative
/// values indicate loss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarResult {
    /// 5th percentile of the series
    pub var_95: f64,

    /// 1st percentile of the series
    pub var_99: f64,

    /// Number of observations the quantiles were taken from
    pub observations: usize,
}

/// Pairwise Pearson correlation of asset return columns
///
/// Square and symmetric, indexed by asset on both axes. Undefined pairs
/// (too little overlap, zero variance) are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCorrelation")]
pub struct CorrelationMatrix {
    assets: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawCorrelation {
    assets: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl TryFrom<RawCorrelation> for CorrelationMatrix {
    type Error = AnalyticsError;

    fn try_from(raw: RawCorrelation) -> Result<Self> {
        let n = raw.assets.len();

        let mut seen = HashSet::with_capacity(n);
        for asset in &raw.assets {
            if !seen.insert(asset.as_str()) {
                return Err(AnalyticsError::InvalidInput(format!(
                    "Duplicate asset identifier: {}",
                    asset
                )));
            }
        }

        if raw.values.len() != n || raw.values.iter().any(|row| row.len() != n) {
            return Err(AnalyticsError::InvalidInput(format!(
                "Correlation matrix must be {}x{} for {} assets",
                n, n, n
            )));
        }

        Ok(Self::from_validated(raw.assets, clean_rows(raw.values)))
    }
}

impl CorrelationMatrix {
    pub(crate) fn from_validated(assets: Vec<String>, values: Vec<Vec<Option<f64>>>) -> Self {
        Self { assets, values }
    }

    /// Asset identifiers labelling both axes
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Row-major entries
    pub fn values(&self) -> &[Vec<Option<f64>>] {
        &self.values
    }

    /// Number of assets on each axis
    pub fn dim(&self) -> usize {
        self.assets.len()
    }

    /// Entry at (row, column)
    pub fn at(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Correlation between two assets; `None` if unknown or undefined
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = position(&self.assets, a)?;
        let j = position(&self.assets, b)?;
        self.at(i, j)
    }

    /// Correlation between two assets, as an error when it cannot be given
    ///
    /// Unknown assets are a configuration error; undefined pairs mean the
    /// overlap held too few observations.
    pub fn try_get(&self, a: &str, b: &str) -> Result<f64> {
        let i = position(&self.assets, a).ok_or_else(|| {
            AnalyticsError::Configuration(format!("Asset not in correlation matrix: {}", a))
        })?;
        let j = position(&self.assets, b).ok_or_else(|| {
            AnalyticsError::Configuration(format!("Asset not in correlation matrix: {}", b))
        })?;

        self.at(i, j).ok_or_else(|| {
            AnalyticsError::InsufficientData(format!(
                "Correlation between {} and {} is undefined (fewer than 2 overlapping observations or zero variance)",
                a, b
            ))
        })
    }

    /// Pairs `(a, b)` with `a` before `b` whose correlation is undefined
    pub fn undefined_pairs(&self) -> Vec<(String, String)> {
        let n = self.dim();
        (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .filter(|&(i, j)| self.values[i][j].is_none())
            .map(|(i, j)| (self.assets[i].clone(), self.assets[j].clone()))
            .collect()
    }

    /// Dense matrix for heatmap rendering, NaN where undefined
    pub fn to_dmatrix(&self) -> DMatrix<f64> {
        let n = self.dim();
        DMatrix::from_fn(n, n, |i, j| self.values[i][j].unwrap_or(f64::NAN))
    }
}
