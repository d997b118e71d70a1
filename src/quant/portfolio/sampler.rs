//! # Monte Carlo Sampler
//!
//! $$
//! u_i \sim \mathcal U(0,1),\qquad w_i = \frac{u_i}{\sum_{j=1}^{k} u_j}
//! $$
//!
//! Random long-only allocations on the probability simplex.

use ndarray::Array1;
use ndarray::Array2;
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Uniform;

use super::error::PortfolioError;
use super::error::Result;

/// Draw one weight vector of length `k` on the simplex.
pub fn draw_weights<R: Rng + ?Sized>(k: usize, rng: &mut R) -> Array1<f64> {
  let unit = Uniform::new(0.0_f64, 1.0);
  loop {
    let raw: Array1<f64> = Array1::random_using(k, &unit, rng);
    let total = raw.sum();
    // an all-zero draw cannot be normalized
    if total > 0.0 {
      return raw / total;
    }
  }
}

/// Draw `n` independent weight vectors for `k` assets, one per row in generation order.
pub fn sample_weights<R: Rng + ?Sized>(k: usize, n: usize, rng: &mut R) -> Result<Array2<f64>> {
  if k == 0 {
    return Err(PortfolioError::config("cannot sample weights for zero assets"));
  }

  let mut weights = Array2::zeros((n, k));
  for mut row in weights.rows_mut() {
    row.assign(&draw_weights(k, rng));
  }
  Ok(weights)
}
