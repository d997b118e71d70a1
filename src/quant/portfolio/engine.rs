//! # Simulation Engine
//!
//! $$
//! \{\mathbf{w}^{(t)}\}_{t=1}^{N} \mapsto \{(\mu_p^{(t)}, \sigma_p^{(t)}, S^{(t)})\}_{t=1}^{N} \mapsto F
//! $$
//!
//! High-level orchestration: configuration, sampling, batched parallel scoring and
//! frontier extraction.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use ndarray::Array2;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::data::AlignedReturns;
use super::error::PortfolioError;
use super::error::Result;
use super::estimator::MarketModel;
use super::estimator::estimate;
use super::frontier::extract_frontier;
use super::metrics::evaluate;
use super::sampler::sample_weights;
use super::types::PortfolioSample;
use super::types::SimulationReport;

/// Runtime configuration for [`SimulationEngine`].
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
  /// Number of Monte Carlo trials.
  pub trials: usize,
  /// Risk-free rate used in Sharpe computations.
  pub risk_free: f64,
  /// Periods per year applied to the mean and covariance estimates.
  pub annualization: f64,
  /// Seed for reproducible weights; drawn from OS entropy when `None`.
  pub seed: Option<u64>,
  /// Trials scored between two cancellation checks.
  pub batch_size: usize,
}

impl Default for SimulationConfig {
  fn default() -> Self {
    Self {
      trials: 10_000,
      risk_free: 0.001,
      annualization: 365.0,
      seed: None,
      batch_size: 1024,
    }
  }
}

impl SimulationConfig {
  pub fn validate(&self) -> Result<()> {
    if self.trials == 0 {
      return Err(PortfolioError::config("trial count must be positive"));
    }
    if self.batch_size == 0 {
      return Err(PortfolioError::config("batch size must be positive"));
    }
    if !self.risk_free.is_finite() {
      return Err(PortfolioError::config(format!(
        "risk-free rate must be finite, got {}",
        self.risk_free
      )));
    }
    if !self.annualization.is_finite() || self.annualization <= 0.0 {
      return Err(PortfolioError::config(format!(
        "annualization factor must be positive and finite, got {}",
        self.annualization
      )));
    }
    Ok(())
  }
}

/// Shared flag to stop a running simulation between batches.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cancel(&self) {
    self.0.store(true, Ordering::Relaxed);
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::Relaxed)
  }
}

/// Single entry point for Monte Carlo frontier runs.
#[derive(Clone, Debug)]
pub struct SimulationEngine {
  config: SimulationConfig,
}

impl SimulationEngine {
  /// Construct a new engine, rejecting invalid configuration.
  pub fn new(config: SimulationConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self { config })
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &SimulationConfig {
    &self.config
  }

  /// Estimate the market model with the configured annualization factor.
  pub fn estimate(&self, returns: &AlignedReturns) -> Result<MarketModel> {
    estimate(returns, self.config.annualization)
  }

  /// Random source for [`run`](Self::run): seeded when configured, otherwise from entropy.
  pub fn rng(&self) -> StdRng {
    match self.config.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    }
  }

  /// Run all trials against `model`, drawing weights from `rng`.
  pub fn run<R: Rng + ?Sized>(&self, model: &MarketModel, rng: &mut R) -> Result<SimulationReport> {
    self.run_with(model, rng, &CancellationToken::new(), |_| {})
  }

  /// Like [`run`](Self::run), checking `cancel` before every batch and reporting
  /// the number of completed trials after each one.
  pub fn run_with<R, F>(
    &self,
    model: &MarketModel,
    rng: &mut R,
    cancel: &CancellationToken,
    mut on_batch: F,
  ) -> Result<SimulationReport>
  where
    R: Rng + ?Sized,
    F: FnMut(usize),
  {
    let n = self.config.trials;
    let risk_free = self.config.risk_free;
    let batch_size = self.config.batch_size;

    info!(
      trials = n,
      assets = model.n_assets(),
      batch_size,
      "starting portfolio simulation"
    );

    let k = model.n_assets();
    let mut scored: Vec<Result<PortfolioSample>> = Vec::with_capacity(n);
    let mut completed = 0;
    let mut batch = 0;
    while completed < n {
      if cancel.is_cancelled() {
        warn!(completed, "simulation cancelled");
        return Err(PortfolioError::Cancelled { completed });
      }

      // weights come from a single sequential stream so seeded runs do not depend on threads
      let len = batch_size.min(n - completed);
      let weights = sample_weights(k, len, rng)?;
      scored.extend(score_trials(completed, &weights, model, risk_free));

      completed += len;
      debug!(batch, completed, "scored batch");
      on_batch(completed);
      batch += 1;
    }

    let (samples, excluded) = partition_scored(scored)?;

    if !excluded.is_empty() {
      warn!(
        excluded = excluded.len(),
        "excluded trials with degenerate volatility"
      );
    }

    let frontier = extract_frontier(&samples);
    info!(
      valid = samples.len(),
      excluded = excluded.len(),
      frontier = frontier.len(),
      "simulation finished"
    );

    Ok(SimulationReport {
      labels: model.labels().to_vec(),
      requested: n,
      samples,
      frontier,
      excluded,
    })
  }
}

/// Score each row of `weights` as trials `start..start + rows`, in parallel and in row order.
fn score_trials(
  start: usize,
  weights: &Array2<f64>,
  model: &MarketModel,
  risk_free: f64,
) -> Vec<Result<PortfolioSample>> {
  (0..weights.nrows())
    .into_par_iter()
    .map(|offset| evaluate(start + offset, weights.row(offset), model, risk_free))
    .collect()
}

/// Split scored trials into valid samples and excluded trial indices, both in trial order.
fn partition_scored(
  scored: Vec<Result<PortfolioSample>>,
) -> Result<(Vec<PortfolioSample>, Vec<usize>)> {
  let mut samples = Vec::with_capacity(scored.len());
  let mut excluded = Vec::new();
  for result in scored {
    match result {
      Ok(sample) => samples.push(sample),
      Err(PortfolioError::DegenerateVolatility { trial, .. }) => excluded.push(trial),
      Err(err) => return Err(err),
    }
  }
  Ok((samples, excluded))
}

/// Estimate the model from `returns` and run a full simulation with `config`.
pub fn simulate(returns: &AlignedReturns, config: SimulationConfig) -> Result<SimulationReport> {
  let engine = SimulationEngine::new(config)?;
  let model = engine.estimate(returns)?;
  engine.run(&model, &mut engine.rng())
}
