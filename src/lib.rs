//! # frontier-rs
//!
//! $$
//! \mathbf{w}\sim\mathcal U(\Delta^{k-1}) \mapsto (\mu_p, \sigma_p, S) \mapsto \text{frontier}
//! $$
//!
//! Randomly samples long-only portfolios over a basket of assets, scores each by
//! expected return, volatility and Sharpe ratio, and extracts a return-increasing
//! envelope over the samples.
//!
//! - [`quant::portfolio`]: loading, estimation, sampling, scoring and frontier extraction.
//! - [`visualization`]: plotly rendering of a [`SimulationReport`].
//!
//! ```ignore
//! let returns = load_returns(&sources, &LoaderConfig::default())?;
//! let report = simulate(&returns, SimulationConfig { seed: Some(7), ..Default::default() })?;
//! frontier_plot(&report).write_html("frontier.html");
//! ```

pub mod quant;
pub mod visualization;

pub use quant::portfolio::AssetSource;
pub use quant::portfolio::LoaderConfig;
pub use quant::portfolio::PortfolioError;
pub use quant::portfolio::SimulationConfig;
pub use quant::portfolio::SimulationEngine;
pub use quant::portfolio::SimulationReport;
pub use quant::portfolio::load_returns;
pub use quant::portfolio::simulate;
pub use visualization::frontier_plot;
