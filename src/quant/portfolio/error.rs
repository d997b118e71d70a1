//! # Portfolio Errors
//!
//! Failure taxonomy for loading, estimation, configuration and per-trial scoring.

use thiserror::Error;

/// Result alias used across the portfolio simulation.
pub type Result<T> = std::result::Result<T, PortfolioError>;

/// Errors raised by the portfolio simulation pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
  /// Missing or unreadable source, malformed table, misaligned assets or a dimension mismatch.
  #[error("input error: {message}")]
  Input { message: String },

  /// Too few overlapping complete observations to estimate the model.
  #[error("insufficient data: need at least {required} overlapping observations, got {available}")]
  InsufficientData { required: usize, available: usize },

  /// A sampled portfolio whose volatility is numerically zero, so its Sharpe ratio is undefined.
  #[error("degenerate volatility {volatility:e} in trial {trial}")]
  DegenerateVolatility { trial: usize, volatility: f64 },

  /// Invalid or malformed configuration option.
  #[error("configuration error: {message}")]
  Config { message: String },

  /// The run observed its cancellation token between batches.
  #[error("simulation cancelled after {completed} trials")]
  Cancelled { completed: usize },
}

impl PortfolioError {
  pub fn input(message: impl Into<String>) -> Self {
    Self::Input {
      message: message.into(),
    }
  }

  pub fn config(message: impl Into<String>) -> Self {
    Self::Config {
      message: message.into(),
    }
  }

  pub fn insufficient_data(required: usize, available: usize) -> Self {
    Self::InsufficientData {
      required,
      available,
    }
  }

  /// Whether the error aborts a run, as opposed to excluding a single trial.
  pub fn is_fatal(&self) -> bool {
    !matches!(self, Self::DegenerateVolatility { .. })
  }
}
