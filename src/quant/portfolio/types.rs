//! # Portfolio Types
//!
//! $$
//! S(\mathbf{w}) = \frac{\mathbf{w}^\top\mu - r_f}{\sqrt{\mathbf{w}^\top \Sigma \mathbf{w}}}
//! $$
//!
//! Scored samples and the owned result container of a simulation run.

use std::cmp::Ordering;

/// One scored Monte Carlo trial.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortfolioSample {
  /// Generation index of the trial.
  pub trial: usize,
  /// Long-only weights summing to one, in model asset order.
  pub weights: Vec<f64>,
  /// Model expected portfolio return (annualized if inputs are annualized).
  pub expected_return: f64,
  /// Model portfolio volatility.
  pub volatility: f64,
  /// Sharpe ratio computed as `(expected_return - risk_free) / volatility`.
  pub sharpe_ratio: f64,
}

impl PortfolioSample {
  /// Per-asset weight percentages, e.g. `BTC: 40.00%, ETH: 60.00%`.
  pub fn weight_annotation(&self, labels: &[String]) -> String {
    format_weights(labels, &self.weights)
  }
}

/// A sample kept by the frontier extraction.
pub type FrontierPoint = PortfolioSample;

pub fn format_weights(labels: &[String], weights: &[f64]) -> String {
  labels
    .iter()
    .zip(weights.iter())
    .map(|(label, w)| format!("{label}: {:.2}%", w * 100.0))
    .collect::<Vec<String>>()
    .join(", ")
}

/// Everything a run produced, in generation order.
#[derive(Clone, Debug, Default)]
pub struct SimulationReport {
  /// Asset labels in model order.
  pub labels: Vec<String>,
  /// Trials requested.
  pub requested: usize,
  /// Valid scored samples.
  pub samples: Vec<PortfolioSample>,
  /// Return-increasing envelope over `samples`.
  pub frontier: Vec<FrontierPoint>,
  /// Trials dropped for degenerate volatility.
  pub excluded: Vec<usize>,
}

impl SimulationReport {
  pub fn valid_count(&self) -> usize {
    self.samples.len()
  }

  pub fn excluded_count(&self) -> usize {
    self.excluded.len()
  }

  /// Sample with the highest Sharpe ratio (first one on ties).
  pub fn max_sharpe(&self) -> Option<&PortfolioSample> {
    self.samples.iter().reduce(|best, s| {
      match s.sharpe_ratio.total_cmp(&best.sharpe_ratio) {
        Ordering::Greater => s,
        _ => best,
      }
    })
  }

  /// Sample with the lowest volatility (first one on ties).
  pub fn min_volatility(&self) -> Option<&PortfolioSample> {
    self.samples.iter().reduce(|best, s| {
      match s.volatility.total_cmp(&best.volatility) {
        Ordering::Less => s,
        _ => best,
      }
    })
  }

  pub fn annotations(&self, points: &[PortfolioSample]) -> Vec<String> {
    points
      .iter()
      .map(|p| p.weight_annotation(&self.labels))
      .collect()
  }
}
