//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Monte Carlo exploration of long-only allocations and an approximate efficient frontier.

pub mod data;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod frontier;
pub mod loader;
pub mod metrics;
pub mod sampler;
pub mod types;

pub use data::AlignedReturns;
pub use data::ReturnSeries;
pub use data::align_return_series;
pub use data::pct_change;
pub use engine::CancellationToken;
pub use engine::SimulationConfig;
pub use engine::SimulationEngine;
pub use engine::simulate;
pub use error::PortfolioError;
pub use error::Result;
pub use estimator::MarketModel;
pub use estimator::estimate;
pub use frontier::extract_frontier;
pub use loader::AssetSource;
pub use loader::LoaderConfig;
pub use loader::load_return_series;
pub use loader::load_returns;
pub use metrics::evaluate;
pub use sampler::draw_weights;
pub use sampler::sample_weights;
pub use types::FrontierPoint;
pub use types::PortfolioSample;
pub use types::SimulationReport;
