//! # Price Loader
//!
//! Reads one CSV price history per asset and turns it into date-indexed returns.

use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::debug;
use tracing::info;

use super::data::AlignedReturns;
use super::data::ReturnSeries;
use super::data::align_return_series;
use super::error::PortfolioError;
use super::error::Result;

/// A labeled price file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetSource {
  pub label: String,
  pub path: PathBuf,
}

impl AssetSource {
  pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
    Self {
      label: label.into(),
      path: path.into(),
    }
  }
}

impl FromStr for AssetSource {
  type Err = PortfolioError;

  /// Parses `LABEL=PATH`; a bare path is labeled with its file stem.
  ///
  /// A label never contains a path separator, so `data/x=1.csv` is a bare path.
  fn from_str(s: &str) -> Result<Self> {
    let labeled = s
      .split_once('=')
      .filter(|(label, _)| !label.chars().any(std::path::is_separator));
    let (label, path) = match labeled {
      Some((label, path)) => (label.trim().to_string(), path.trim()),
      None => {
        let stem = Path::new(s.trim())
          .file_stem()
          .map(|os| os.to_string_lossy().into_owned())
          .unwrap_or_default();
        (stem, s.trim())
      }
    };

    if label.is_empty() || path.is_empty() {
      return Err(PortfolioError::config(format!(
        "malformed asset source '{s}', expected LABEL=PATH"
      )));
    }
    Ok(Self::new(label, path))
  }
}

impl fmt::Display for AssetSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}={}", self.label, self.path.display())
  }
}

/// Column layout of the price files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoaderConfig {
  pub date_column: String,
  pub price_column: String,
  /// `chrono` format of the date column.
  pub date_format: String,
}

impl Default for LoaderConfig {
  fn default() -> Self {
    Self {
      date_column: "Date".to_string(),
      price_column: "Close".to_string(),
      date_format: "%Y-%m-%d".to_string(),
    }
  }
}

fn column_index(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
  headers
    .iter()
    .position(|h| h.trim() == name)
    .ok_or_else(|| {
      PortfolioError::input(format!(
        "column '{name}' not found in {}",
        path.display()
      ))
    })
}

/// Load one price file. Empty or non-numeric prices become missing values.
pub fn load_return_series(source: &AssetSource, cfg: &LoaderConfig) -> Result<ReturnSeries> {
  let path = source.path.as_path();
  let mut reader = csv::Reader::from_path(path).map_err(|e| {
    PortfolioError::input(format!("cannot read {}: {e}", path.display()))
  })?;

  let headers = reader
    .headers()
    .map_err(|e| PortfolioError::input(format!("bad header in {}: {e}", path.display())))?
    .clone();
  let date_idx = column_index(&headers, &cfg.date_column, path)?;
  let price_idx = column_index(&headers, &cfg.price_column, path)?;

  let mut dates = Vec::new();
  let mut prices = Vec::new();
  for (row, record) in reader.records().enumerate() {
    let record = record.map_err(|e| {
      PortfolioError::input(format!("bad row {} in {}: {e}", row + 1, path.display()))
    })?;

    let raw_date = record.get(date_idx).unwrap_or_default().trim();
    let date = NaiveDate::parse_from_str(raw_date, &cfg.date_format).map_err(|e| {
      PortfolioError::input(format!(
        "bad date '{raw_date}' at row {} in {}: {e}",
        row + 1,
        path.display()
      ))
    })?;
    let price = record
      .get(price_idx)
      .and_then(|p| p.trim().parse::<f64>().ok())
      .unwrap_or(f64::NAN);

    dates.push(date);
    prices.push(price);
  }

  debug!(asset = %source.label, rows = prices.len(), "loaded price history");
  ReturnSeries::from_prices(source.label.clone(), dates, &prices)
}

/// Load every source and align the assets on their common dates.
pub fn load_returns(sources: &[AssetSource], cfg: &LoaderConfig) -> Result<AlignedReturns> {
  if sources.len() < 2 {
    return Err(PortfolioError::input(format!(
      "at least 2 assets are required, got {}",
      sources.len()
    )));
  }

  let series = sources
    .iter()
    .map(|s| load_return_series(s, cfg))
    .collect::<Result<Vec<ReturnSeries>>>()?;
  let aligned = align_return_series(&series)?;

  info!(
    assets = aligned.n_assets(),
    observations = aligned.n_observations(),
    "loaded aligned returns"
  );
  Ok(aligned)
}
