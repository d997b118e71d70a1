//! # Efficient Frontier Extraction
//!
//! $$
//! F = \{\, s_t : \mu_{s_t} > \mu_{s_{\tau}},\ \tau = \text{last kept index} < t \,\}
//! $$
//!
//! Return-increasing envelope over the sampling sequence.
//!
//! This is not the textbook frontier (the best return per volatility level after
//! sorting by volatility). Samples are scanned in generation order and a sample is
//! kept when its expected return strictly beats the last kept one, so the result
//! depends on the order the trials were drawn in.

use super::types::FrontierPoint;
use super::types::PortfolioSample;

/// Keep every sample whose expected return strictly exceeds the previously kept one.
pub fn extract_frontier(samples: &[PortfolioSample]) -> Vec<FrontierPoint> {
  let mut frontier: Vec<FrontierPoint> = Vec::new();
  for sample in samples {
    let keep = frontier
      .last()
      .map_or(true, |last| sample.expected_return > last.expected_return);
    if keep {
      frontier.push(sample.clone());
    }
  }
  frontier
}

#[cfg(test)]
mod tests {
  use rand::Rng;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  use super::*;

  fn with_returns(returns: &[f64]) -> Vec<PortfolioSample> {
    returns
      .iter()
      .enumerate()
      .map(|(trial, &r)| PortfolioSample {
        trial,
        weights: vec![1.0],
        expected_return: r,
        volatility: 0.1 + trial as f64,
        sharpe_ratio: r / (0.1 + trial as f64),
      })
      .collect()
  }

  #[test]
  fn keeps_strict_record_highs_in_generation_order() {
    let samples = with_returns(&[0.05, 0.03, 0.07, 0.07, 0.06, 0.09, 0.01]);
    let trials: Vec<usize> = extract_frontier(&samples).iter().map(|p| p.trial).collect();

    assert_eq!(trials, vec![0, 2, 5]);
  }

  #[test]
  fn empty_input_gives_empty_frontier() {
    assert!(extract_frontier(&[]).is_empty());
  }

  #[test]
  fn frontier_is_increasing_subsequence() {
    let mut rng = StdRng::seed_from_u64(11);
    let returns: Vec<f64> = (0..500).map(|_| rng.gen_range(-0.2..0.4)).collect();
    let samples = with_returns(&returns);
    let frontier = extract_frontier(&samples);

    assert!(!frontier.is_empty());
    assert_eq!(frontier[0], samples[0]);
    for pair in frontier.windows(2) {
      assert!(pair[1].expected_return > pair[0].expected_return);
      assert!(pair[1].trial > pair[0].trial);
    }
    for point in &frontier {
      assert_eq!(&samples[point.trial], point);
    }
  }

  #[test]
  fn extraction_is_deterministic() {
    let samples = with_returns(&[0.2, 0.1, 0.3, 0.25, 0.4]);
    assert_eq!(extract_frontier(&samples), extract_frontier(&samples));
  }
}
