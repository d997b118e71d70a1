//! # Visualization
//!
//! $$
//! \{(\sigma_p^{(t)}, \mu_p^{(t)}, S^{(t)})\}_{t} \mapsto \text{scatter} \cup \text{frontier line}
//! $$
//!
//! Presentation layer over [`SimulationReport`]; the engine never calls into it.

use std::fs;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use plotly::Layout;
use plotly::Plot;
use plotly::Scatter;
use plotly::common::ColorScale;
use plotly::common::ColorScalePalette;
use plotly::common::HoverInfo;
use plotly::common::Line;
use plotly::common::Marker;
use plotly::common::Mode;
use plotly::layout::Axis;
use plotly::layout::HoverMode;

use crate::quant::portfolio::SimulationReport;

/// Scatter of every valid sample colored by Sharpe ratio, overlaid with the frontier.
pub fn frontier_plot(report: &SimulationReport) -> Plot {
  let vols: Vec<f64> = report.samples.iter().map(|s| s.volatility).collect();
  let rets: Vec<f64> = report.samples.iter().map(|s| s.expected_return).collect();
  let sharpes: Vec<f64> = report.samples.iter().map(|s| s.sharpe_ratio).collect();

  let portfolios = Scatter::new(vols, rets)
    .mode(Mode::Markers)
    .name("Portfolios")
    .marker(
      Marker::new()
        .color_array(sharpes)
        .color_scale(ColorScale::Palette(ColorScalePalette::Viridis))
        .size(5)
        .show_scale(true),
    );

  let frontier = Scatter::new(
    report.frontier.iter().map(|p| p.volatility).collect::<Vec<f64>>(),
    report
      .frontier
      .iter()
      .map(|p| p.expected_return)
      .collect::<Vec<f64>>(),
  )
  .mode(Mode::LinesMarkers)
  .name("Efficient Frontier")
  .line(Line::new().color("magenta").width(4.0))
  .text_array(report.annotations(&report.frontier))
  .hover_info(HoverInfo::Text);

  let mut plot = Plot::new();
  plot.add_trace(portfolios);
  plot.add_trace(frontier);
  plot.set_layout(
    Layout::new()
      .title("Portfolio Optimization with Efficient Frontier")
      .x_axis(Axis::new().title("Volatility (Standard Deviation)"))
      .y_axis(Axis::new().title("Expected Return"))
      .hover_mode(HoverMode::Closest),
  );
  plot
}

/// Render the report to a standalone HTML file, creating parent directories.
pub fn write_frontier_html(report: &SimulationReport, output_html: impl AsRef<Path>) -> Result<()> {
  let output_html = output_html.as_ref();
  if let Some(parent) = output_html.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)
      .with_context(|| format!("failed creating plot output directory {:?}", parent))?;
  }
  frontier_plot(report).write_html(output_html);
  Ok(())
}
