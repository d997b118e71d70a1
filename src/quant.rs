//! # Quant
//!
//! $$
//! \max_{\mathbf{w}\in\Delta^{k-1}} \frac{\mathbf{w}^\top\mu - r_f}{\sqrt{\mathbf{w}^\top\Sigma\mathbf{w}}}
//! $$
//!
pub mod portfolio;
