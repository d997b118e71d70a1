//! # Statistics Estimator
//!
//! $$
//! \hat\mu = A\,\bar r,\qquad \hat\Sigma = \frac{A}{T-1}\sum_{t=1}^{T}(r_t-\bar r)(r_t-\bar r)^\top
//! $$
//!
//! Annualized historical mean vector and covariance matrix over aligned returns.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;
use ndarray_stats::CorrelationExt;
use tracing::debug;

use super::data::AlignedReturns;
use super::error::PortfolioError;
use super::error::Result;

/// Minimum number of complete observations for a sample covariance.
pub const MIN_OBSERVATIONS: usize = 2;

const SYMMETRY_TOL: f64 = 1e-10;

/// Mean/covariance model over a fixed asset ordering.
#[derive(Clone, Debug)]
pub struct MarketModel {
  labels: Vec<String>,
  mean: Array1<f64>,
  cov: Array2<f64>,
  observations: usize,
}

impl MarketModel {
  /// Build a model from precomputed statistics.
  pub fn new(labels: Vec<String>, mean: Array1<f64>, cov: Array2<f64>) -> Result<Self> {
    let n = labels.len();
    if n == 0 {
      return Err(PortfolioError::input("model needs at least one asset"));
    }
    if mean.len() != n || cov.dim() != (n, n) {
      return Err(PortfolioError::input(format!(
        "model dimensions disagree: {n} labels, mean of length {}, covariance of shape {:?}",
        mean.len(),
        cov.dim()
      )));
    }
    if mean.iter().chain(cov.iter()).any(|v| !v.is_finite()) {
      return Err(PortfolioError::input("model contains non-finite statistics"));
    }
    for i in 0..n {
      for j in (i + 1)..n {
        if (cov[[i, j]] - cov[[j, i]]).abs() > SYMMETRY_TOL {
          return Err(PortfolioError::input(format!(
            "covariance matrix is not symmetric at ({i}, {j})"
          )));
        }
      }
    }

    Ok(Self {
      labels,
      mean,
      cov,
      observations: 0,
    })
  }

  pub fn labels(&self) -> &[String] {
    &self.labels
  }

  pub fn mean(&self) -> &Array1<f64> {
    &self.mean
  }

  pub fn cov(&self) -> &Array2<f64> {
    &self.cov
  }

  pub fn n_assets(&self) -> usize {
    self.labels.len()
  }

  /// Complete observations the model was estimated from (0 if built directly).
  pub fn observations(&self) -> usize {
    self.observations
  }

  /// Per-asset annualized volatility, the square root of the covariance diagonal.
  pub fn volatilities(&self) -> Array1<f64> {
    self.cov.diag().mapv(|v| v.max(0.0).sqrt())
  }

  /// Correlation matrix implied by the covariance matrix.
  pub fn correlation(&self) -> Array2<f64> {
    let sigmas = self.volatilities();
    let n = self.n_assets();
    Array2::from_shape_fn((n, n), |(i, j)| {
      let denom = sigmas[i] * sigmas[j];
      if i == j {
        1.0
      } else if denom > 1e-15 {
        (self.cov[[i, j]] / denom).clamp(-1.0, 1.0)
      } else {
        0.0
      }
    })
  }
}

/// Estimate the annualized mean vector and covariance matrix.
///
/// `annualization` multiplies both the per-period means and covariances
/// (365 for assets traded every day, 252 for business-day markets).
pub fn estimate(returns: &AlignedReturns, annualization: f64) -> Result<MarketModel> {
  if !annualization.is_finite() || annualization <= 0.0 {
    return Err(PortfolioError::config(format!(
      "annualization factor must be positive and finite, got {annualization}"
    )));
  }
  if returns.n_assets() < 2 {
    return Err(PortfolioError::input(format!(
      "at least 2 assets are required, got {}",
      returns.n_assets()
    )));
  }
  let available = returns.n_observations();
  if available < MIN_OBSERVATIONS {
    return Err(PortfolioError::insufficient_data(MIN_OBSERVATIONS, available));
  }

  let values = returns.values();
  let mean = values
    .mean_axis(Axis(1))
    .ok_or_else(|| PortfolioError::insufficient_data(MIN_OBSERVATIONS, available))?
    * annualization;
  let mut cov = values
    .cov(1.0)
    .map_err(|_| PortfolioError::insufficient_data(MIN_OBSERVATIONS, available))?
    * annualization;

  // mirror the upper triangle so the matrix is exactly symmetric
  let n = cov.nrows();
  for i in 0..n {
    for j in (i + 1)..n {
      cov[[j, i]] = cov[[i, j]];
    }
  }

  debug!(
    assets = n,
    observations = available,
    annualization,
    "estimated market model"
  );

  Ok(MarketModel {
    labels: returns.labels().to_vec(),
    mean,
    cov,
    observations: available,
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;

  fn two_assets() -> AlignedReturns {
    AlignedReturns::from_columns(
      vec!["A".into(), "B".into()],
      &[
        vec![0.01, 0.02, 0.01, 0.02],
        vec![0.00, 0.01, 0.00, 0.01],
      ],
    )
    .unwrap()
  }

  #[test]
  fn estimates_sample_mean_and_covariance() {
    let model = estimate(&two_assets(), 1.0).unwrap();

    assert_abs_diff_eq!(model.mean()[0], 0.015, epsilon = 1e-12);
    assert_abs_diff_eq!(model.mean()[1], 0.005, epsilon = 1e-12);
    // sample variance of [0.01, 0.02, 0.01, 0.02] with ddof = 1
    let var_a = 4.0 * 0.005_f64.powi(2) / 3.0;
    assert_abs_diff_eq!(model.cov()[[0, 0]], var_a, epsilon = 1e-15);
    assert_abs_diff_eq!(model.cov()[[0, 1]], var_a, epsilon = 1e-15);
    assert_eq!(model.observations(), 4);
  }

  #[test]
  fn annualization_scales_mean_and_covariance() {
    let daily = estimate(&two_assets(), 1.0).unwrap();
    let yearly = estimate(&two_assets(), 365.0).unwrap();

    assert_abs_diff_eq!(yearly.mean()[0], daily.mean()[0] * 365.0, epsilon = 1e-12);
    assert_abs_diff_eq!(
      yearly.cov()[[1, 1]],
      daily.cov()[[1, 1]] * 365.0,
      epsilon = 1e-12
    );
  }

  #[test]
  fn covariance_is_symmetric() {
    let aligned = AlignedReturns::from_columns(
      vec!["A".into(), "B".into(), "C".into()],
      &[
        vec![0.013, -0.021, 0.004, 0.017, -0.008],
        vec![0.002, 0.011, -0.019, 0.006, 0.001],
        vec![-0.031, 0.027, 0.012, -0.004, 0.009],
      ],
    )
    .unwrap();
    let model = estimate(&aligned, 252.0).unwrap();
    let cov = model.cov();

    for i in 0..3 {
      for j in 0..3 {
        assert_eq!(cov[[i, j]], cov[[j, i]]);
      }
    }
  }

  #[test]
  fn single_observation_is_insufficient() {
    let aligned =
      AlignedReturns::from_columns(vec!["A".into(), "B".into()], &[vec![0.01], vec![0.02]])
        .unwrap();

    assert_eq!(
      estimate(&aligned, 365.0).unwrap_err(),
      PortfolioError::insufficient_data(2, 1)
    );
  }

  #[test]
  fn rejects_bad_annualization() {
    assert!(matches!(
      estimate(&two_assets(), 0.0),
      Err(PortfolioError::Config { .. })
    ));
    assert!(matches!(
      estimate(&two_assets(), f64::NAN),
      Err(PortfolioError::Config { .. })
    ));
  }

  #[test]
  fn correlation_from_covariance() {
    let model = MarketModel::new(
      vec!["A".into(), "B".into()],
      array![0.1, 0.2],
      array![[0.04, 0.006], [0.006, 0.09]],
    )
    .unwrap();

    let corr = model.correlation();
    assert_abs_diff_eq!(corr[[0, 1]], 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(corr[[1, 1]], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(model.volatilities()[1], 0.3, epsilon = 1e-12);
  }

  #[test]
  fn new_rejects_asymmetric_or_mismatched_inputs() {
    let asym = MarketModel::new(
      vec!["A".into(), "B".into()],
      array![0.1, 0.2],
      array![[0.04, 0.01], [0.02, 0.09]],
    );
    assert!(matches!(asym, Err(PortfolioError::Input { .. })));

    let mismatched = MarketModel::new(vec!["A".into()], array![0.1, 0.2], array![[0.04]]);
    assert!(matches!(mismatched, Err(PortfolioError::Input { .. })));
  }
}
