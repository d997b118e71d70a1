//! # Portfolio Data Utilities
//!
//! $$
//! r_t = \frac{P_t}{P_{t-1}} - 1
//! $$
//!
//! Return preprocessing and date alignment across assets.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use ndarray::Array2;
use ndarray::ArrayView1;
use tracing::debug;

use super::error::PortfolioError;
use super::error::Result;

/// Period-over-period returns of one asset, indexed by date. `NaN` marks a missing value.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnSeries {
  pub label: String,
  pub index: Vec<NaiveDate>,
  pub returns: Vec<f64>,
}

impl ReturnSeries {
  pub fn new(label: impl Into<String>, index: Vec<NaiveDate>, returns: Vec<f64>) -> Result<Self> {
    let label = label.into();
    if index.len() != returns.len() {
      return Err(PortfolioError::input(format!(
        "asset '{label}' has {} dates but {} returns",
        index.len(),
        returns.len()
      )));
    }
    Ok(Self {
      label,
      index,
      returns,
    })
  }

  /// Build fractional-change returns from a price column.
  ///
  /// The first row has no predecessor and is missing, as is any row touching a missing price.
  pub fn from_prices(
    label: impl Into<String>,
    index: Vec<NaiveDate>,
    prices: &[f64],
  ) -> Result<Self> {
    Self::new(label, index, pct_change(prices))
  }

  pub fn len(&self) -> usize {
    self.returns.len()
  }

  pub fn is_empty(&self) -> bool {
    self.returns.is_empty()
  }
}

/// Fractional change between consecutive prices. Output has the same length as the input.
pub fn pct_change(prices: &[f64]) -> Vec<f64> {
  let mut out = Vec::with_capacity(prices.len());
  if prices.is_empty() {
    return out;
  }

  out.push(f64::NAN);
  for i in 1..prices.len() {
    let (prev, curr) = (prices[i - 1], prices[i]);
    if prev.is_finite() && curr.is_finite() && prev != 0.0 {
      out.push(curr / prev - 1.0);
    } else {
      out.push(f64::NAN);
    }
  }
  out
}

/// Returns of several assets on a common index, rows with any missing value removed.
#[derive(Clone, Debug)]
pub struct AlignedReturns {
  labels: Vec<String>,
  dates: Vec<NaiveDate>,
  /// Shape `(assets, observations)`.
  values: Array2<f64>,
}

impl AlignedReturns {
  /// Align equally long columns by position, dropping rows where any asset is missing.
  pub fn from_columns(labels: Vec<String>, columns: &[Vec<f64>]) -> Result<Self> {
    check_asset_count(labels.len())?;
    if labels.len() != columns.len() {
      return Err(PortfolioError::input(format!(
        "{} labels for {} return columns",
        labels.len(),
        columns.len()
      )));
    }

    let n_rows = columns[0].len();
    if let Some((pos, col)) = columns.iter().enumerate().find(|(_, c)| c.len() != n_rows) {
      return Err(PortfolioError::input(format!(
        "column '{}' has {} rows, expected {n_rows}",
        labels[pos],
        col.len()
      )));
    }

    let rows: Vec<Vec<f64>> = (0..n_rows)
      .map(|t| columns.iter().map(|c| c[t]).collect::<Vec<f64>>())
      .filter(|row| row.iter().all(|v| v.is_finite()))
      .collect();

    Ok(Self {
      values: rows_to_matrix(labels.len(), &rows),
      labels,
      dates: Vec::new(),
    })
  }

  pub fn labels(&self) -> &[String] {
    &self.labels
  }

  /// Dates of the surviving rows; empty when aligned by position.
  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn values(&self) -> &Array2<f64> {
    &self.values
  }

  pub fn n_assets(&self) -> usize {
    self.values.nrows()
  }

  pub fn n_observations(&self) -> usize {
    self.values.ncols()
  }

  pub fn asset(&self, idx: usize) -> ArrayView1<'_, f64> {
    self.values.row(idx)
  }
}

fn check_asset_count(n: usize) -> Result<()> {
  if n < 2 {
    return Err(PortfolioError::input(format!(
      "at least 2 assets are required, got {n}"
    )));
  }
  Ok(())
}

fn rows_to_matrix(n_assets: usize, rows: &[Vec<f64>]) -> Array2<f64> {
  Array2::from_shape_fn((n_assets, rows.len()), |(i, t)| rows[t][i])
}

/// Inner-join return series on their dates, then drop rows where any asset is missing.
pub fn align_return_series(series: &[ReturnSeries]) -> Result<AlignedReturns> {
  check_asset_count(series.len())?;

  let mut by_date = Vec::with_capacity(series.len());
  for s in series {
    if s.index.len() != s.returns.len() {
      return Err(PortfolioError::input(format!(
        "asset '{}' has {} dates but {} returns",
        s.label,
        s.index.len(),
        s.returns.len()
      )));
    }
    let mut map = BTreeMap::new();
    for (date, &r) in s.index.iter().zip(s.returns.iter()) {
      if map.insert(*date, r).is_some() {
        return Err(PortfolioError::input(format!(
          "asset '{}' has duplicate date {date}",
          s.label
        )));
      }
    }
    by_date.push(map);
  }

  let mut common: BTreeSet<NaiveDate> = by_date[0].keys().copied().collect();
  for map in &by_date[1..] {
    common.retain(|d| map.contains_key(d));
  }
  if common.is_empty() {
    return Err(PortfolioError::input(
      "asset date ranges do not overlap",
    ));
  }

  let mut dates = Vec::with_capacity(common.len());
  let mut rows = Vec::with_capacity(common.len());
  for date in common {
    let row: Vec<f64> = by_date.iter().map(|m| m[&date]).collect();
    if row.iter().all(|v| v.is_finite()) {
      dates.push(date);
      rows.push(row);
    }
  }

  debug!(
    assets = series.len(),
    observations = rows.len(),
    "aligned return series"
  );

  Ok(AlignedReturns {
    labels: series.iter().map(|s| s.label.clone()).collect(),
    values: rows_to_matrix(series.len(), &rows),
    dates,
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
  }

  #[test]
  fn pct_change_marks_first_and_gapped_rows_missing() {
    let r = pct_change(&[100.0, 110.0, f64::NAN, 121.0, 0.0, 5.0]);

    assert_eq!(r.len(), 6);
    assert!(r[0].is_nan());
    assert_abs_diff_eq!(r[1], 0.1, epsilon = 1e-12);
    assert!(r[2].is_nan());
    assert!(r[3].is_nan());
    assert_abs_diff_eq!(r[4], -1.0, epsilon = 1e-12);
    assert!(r[5].is_nan());
  }

  #[test]
  fn from_columns_drops_rows_with_any_missing_value() {
    let aligned = AlignedReturns::from_columns(
      vec!["A".into(), "B".into()],
      &[
        vec![f64::NAN, 0.01, 0.02, 0.03],
        vec![0.5, 0.02, f64::NAN, 0.04],
      ],
    )
    .unwrap();

    assert_eq!(aligned.n_assets(), 2);
    assert_eq!(aligned.n_observations(), 2);
    assert_eq!(aligned.asset(0).to_vec(), vec![0.01, 0.03]);
    assert_eq!(aligned.asset(1).to_vec(), vec![0.02, 0.04]);
    assert!(aligned.dates().is_empty());
  }

  #[test]
  fn from_columns_rejects_ragged_columns_and_single_asset() {
    let ragged =
      AlignedReturns::from_columns(vec!["A".into(), "B".into()], &[vec![0.1, 0.2], vec![0.1]]);
    assert!(matches!(ragged, Err(PortfolioError::Input { .. })));

    let single = AlignedReturns::from_columns(vec!["A".into()], &[vec![0.1, 0.2]]);
    assert!(matches!(single, Err(PortfolioError::Input { .. })));
  }

  #[test]
  fn align_joins_on_common_dates() {
    let a = ReturnSeries::from_prices("A", vec![day(1), day(2), day(3), day(4)], &[
      10.0, 11.0, 12.1, 13.31,
    ])
    .unwrap();
    let b = ReturnSeries::new("B", vec![day(3), day(4), day(5)], vec![0.5, -0.5, 0.25]).unwrap();

    let aligned = align_return_series(&[a, b]).unwrap();

    assert_eq!(aligned.labels(), &["A".to_string(), "B".to_string()]);
    assert_eq!(aligned.dates(), &[day(3), day(4)]);
    assert_abs_diff_eq!(aligned.values()[[0, 0]], 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(aligned.values()[[1, 1]], -0.5, epsilon = 1e-12);
  }

  #[test]
  fn align_rejects_disjoint_date_ranges() {
    let a = ReturnSeries::new("A", vec![day(1), day(2)], vec![0.1, 0.2]).unwrap();
    let b = ReturnSeries::new("B", vec![day(3), day(4)], vec![0.1, 0.2]).unwrap();

    let err = align_return_series(&[a, b]).unwrap_err();
    assert!(matches!(err, PortfolioError::Input { .. }));
  }

  #[test]
  fn align_rejects_duplicate_dates() {
    let a = ReturnSeries::new("A", vec![day(1), day(1)], vec![0.1, 0.2]).unwrap();
    let b = ReturnSeries::new("B", vec![day(1), day(2)], vec![0.1, 0.2]).unwrap();

    assert!(align_return_series(&[a, b]).is_err());
  }

  #[test]
  fn series_requires_matching_lengths() {
    assert!(ReturnSeries::new("A", vec![day(1)], vec![0.1, 0.2]).is_err());
  }
}
