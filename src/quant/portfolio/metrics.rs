//! # Portfolio Metrics
//!
//! $$
//! \mu_p=\mathbf{w}^\top\mu,\qquad \sigma_p=\sqrt{\mathbf{w}^\top\Sigma\mathbf{w}},\qquad S=\frac{\mu_p-r_f}{\sigma_p}
//! $$
//!
//! Pure scoring of a weight vector against a [`MarketModel`].

use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;

use super::error::PortfolioError;
use super::error::Result;
use super::estimator::MarketModel;
use super::types::PortfolioSample;

/// Volatilities below this are treated as zero.
pub const VOLATILITY_EPS: f64 = 1e-12;

pub fn portfolio_return(weights: ArrayView1<'_, f64>, mean: &Array1<f64>) -> f64 {
  weights.dot(mean)
}

/// Quadratic form `wᵀ Σ w`. May be slightly negative from rounding.
pub fn portfolio_variance(weights: ArrayView1<'_, f64>, cov: &Array2<f64>) -> f64 {
  weights.dot(&cov.dot(&weights))
}

/// Score one trial.
///
/// Fails with [`PortfolioError::DegenerateVolatility`] when the volatility is
/// numerically zero, and with [`PortfolioError::Input`] on a dimension mismatch.
pub fn evaluate(
  trial: usize,
  weights: ArrayView1<'_, f64>,
  model: &MarketModel,
  risk_free: f64,
) -> Result<PortfolioSample> {
  if weights.len() != model.n_assets() {
    return Err(PortfolioError::input(format!(
      "weight vector of length {} for a {}-asset model",
      weights.len(),
      model.n_assets()
    )));
  }

  let expected_return = portfolio_return(weights, model.mean());
  let variance = portfolio_variance(weights, model.cov());
  if !variance.is_finite() || variance < VOLATILITY_EPS * VOLATILITY_EPS {
    return Err(PortfolioError::DegenerateVolatility {
      trial,
      volatility: variance.max(0.0).sqrt(),
    });
  }

  let volatility = variance.sqrt();
  Ok(PortfolioSample {
    trial,
    weights: weights.to_vec(),
    expected_return,
    volatility,
    sharpe_ratio: (expected_return - risk_free) / volatility,
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;
  use crate::quant::portfolio::data::AlignedReturns;
  use crate::quant::portfolio::estimator::estimate;

  fn sample_std(xs: &[f64]) -> f64 {
    let m = xs.iter().sum::<f64>() / xs.len() as f64;
    let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    var.sqrt()
  }

  #[test]
  fn corner_portfolios_match_single_asset_statistics() {
    let a = vec![0.01, 0.02, 0.01, 0.02];
    let b = vec![0.00, 0.01, 0.00, 0.01];
    let aligned =
      AlignedReturns::from_columns(vec!["A".into(), "B".into()], &[a.clone(), b.clone()]).unwrap();
    let model = estimate(&aligned, 1.0).unwrap();

    let all_a = evaluate(0, array![1.0, 0.0].view(), &model, 0.0).unwrap();
    assert_abs_diff_eq!(all_a.expected_return, 0.015, epsilon = 1e-12);
    assert_abs_diff_eq!(all_a.volatility, sample_std(&a), epsilon = 1e-12);

    let all_b = evaluate(1, array![0.0, 1.0].view(), &model, 0.0).unwrap();
    assert_abs_diff_eq!(all_b.expected_return, 0.005, epsilon = 1e-12);
    assert_abs_diff_eq!(all_b.volatility, sample_std(&b), epsilon = 1e-12);
  }

  #[test]
  fn sharpe_uses_risk_free_rate() {
    let model = MarketModel::new(
      vec!["A".into(), "B".into()],
      array![0.10, 0.20],
      array![[0.04, 0.0], [0.0, 0.09]],
    )
    .unwrap();

    let s = evaluate(5, array![0.5, 0.5].view(), &model, 0.01).unwrap();
    let vol = (0.25_f64 * 0.04 + 0.25 * 0.09).sqrt();

    assert_eq!(s.trial, 5);
    assert_abs_diff_eq!(s.expected_return, 0.15, epsilon = 1e-12);
    assert_abs_diff_eq!(s.volatility, vol, epsilon = 1e-12);
    assert_abs_diff_eq!(s.sharpe_ratio, (0.15 - 0.01) / vol, epsilon = 1e-12);
    assert_eq!(s.weights, vec![0.5, 0.5]);
  }

  #[test]
  fn constant_single_asset_is_degenerate() {
    let model = MarketModel::new(vec!["FLAT".into()], array![0.02], array![[0.0]]).unwrap();

    let err = evaluate(9, array![1.0].view(), &model, 0.001).unwrap_err();
    assert_eq!(
      err,
      PortfolioError::DegenerateVolatility {
        trial: 9,
        volatility: 0.0
      }
    );
  }

  #[test]
  fn dimension_mismatch_is_an_input_error() {
    let model = MarketModel::new(vec!["A".into()], array![0.02], array![[0.01]]).unwrap();
    assert!(matches!(
      evaluate(0, array![0.5, 0.5].view(), &model, 0.0),
      Err(PortfolioError::Input { .. })
    ));
  }
}
