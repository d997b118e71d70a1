use std::path::PathBuf;
use std::time::Duration;
use std::time::Instant;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use frontier_rs::quant::portfolio::AssetSource;
use frontier_rs::quant::portfolio::CancellationToken;
use frontier_rs::quant::portfolio::LoaderConfig;
use frontier_rs::quant::portfolio::MarketModel;
use frontier_rs::quant::portfolio::PortfolioError;
use frontier_rs::quant::portfolio::PortfolioSample;
use frontier_rs::quant::portfolio::SimulationConfig;
use frontier_rs::quant::portfolio::SimulationEngine;
use frontier_rs::quant::portfolio::SimulationReport;
use frontier_rs::quant::portfolio::load_returns;
use frontier_rs::visualization::write_frontier_html;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use prettytable::Table;
use prettytable::row;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "frontier")]
#[command(about = "Monte Carlo portfolio sampling with an approximate efficient frontier", long_about = None)]
struct Cli {
  /// Asset price file as LABEL=PATH (repeat for every asset)
  #[arg(short, long = "asset", required = true)]
  assets: Vec<AssetSource>,

  /// Number of random portfolios
  #[arg(short = 'n', long, default_value_t = 10_000)]
  trials: usize,

  /// Risk-free rate used in the Sharpe ratio
  #[arg(short, long, default_value_t = 0.001)]
  risk_free: f64,

  /// Periods per year (365 for crypto, 252 for equities)
  #[arg(long, default_value_t = 365.0)]
  annualization: f64,

  /// Seed for reproducible runs
  #[arg(short, long)]
  seed: Option<u64>,

  /// Trials scored between cancellation checks
  #[arg(long, default_value_t = 1024)]
  batch_size: usize,

  /// Name of the date column
  #[arg(long, default_value = "Date")]
  date_column: String,

  /// Name of the price column
  #[arg(long, default_value = "Close")]
  price_column: String,

  /// chrono format of the date column
  #[arg(long, default_value = "%Y-%m-%d")]
  date_format: String,

  /// Write the chart to this HTML file
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Stop scoring after this many seconds; a run cut short produces no report
  #[arg(long)]
  time_limit: Option<f64>,

  /// Hide the progress bar
  #[arg(long)]
  quiet: bool,
}

fn init_tracing() {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("frontier_rs=info,frontier=info")),
    )
    .with_writer(std::io::stderr)
    .init();
}

fn print_model(model: &MarketModel) {
  let vols = model.volatilities();
  let mut table = Table::new();
  table.add_row(row!["Asset", "Mean return", "Volatility"]);
  for (i, label) in model.labels().iter().enumerate() {
    table.add_row(row![
      label,
      format!("{:.4}", model.mean()[i]),
      format!("{:.4}", vols[i])
    ]);
  }
  table.printstd();
}

fn print_report(report: &SimulationReport) {
  println!(
    "{} valid trials, {} excluded (degenerate volatility), {} frontier points",
    report.valid_count(),
    report.excluded_count(),
    report.frontier.len()
  );

  let mut table = Table::new();
  table.add_row(row!["Portfolio", "Return", "Volatility", "Sharpe", "Weights"]);
  let picks: [(&str, Option<&PortfolioSample>); 2] = [
    ("Max Sharpe", report.max_sharpe()),
    ("Min volatility", report.min_volatility()),
  ];
  for (name, sample) in picks {
    if let Some(s) = sample {
      table.add_row(row![
        name,
        format!("{:.4}", s.expected_return),
        format!("{:.4}", s.volatility),
        format!("{:.4}", s.sharpe_ratio),
        s.weight_annotation(&report.labels)
      ]);
    }
  }
  table.printstd();
}

fn main() -> Result<()> {
  init_tracing();
  let cli = Cli::parse();

  let engine = SimulationEngine::new(SimulationConfig {
    trials: cli.trials,
    risk_free: cli.risk_free,
    annualization: cli.annualization,
    seed: cli.seed,
    batch_size: cli.batch_size,
  })?;
  let time_limit = match cli.time_limit {
    Some(secs) if !secs.is_finite() || secs < 0.0 => {
      anyhow::bail!("time limit must be a non-negative number of seconds, got {secs}")
    }
    Some(secs) => Some(Duration::from_secs_f64(secs)),
    None => None,
  };
  let loader = LoaderConfig {
    date_column: cli.date_column,
    price_column: cli.price_column,
    date_format: cli.date_format,
  };

  let returns = load_returns(&cli.assets, &loader)?;
  let model = engine.estimate(&returns)?;
  print_model(&model);

  let progress = if cli.quiet {
    ProgressBar::hidden()
  } else {
    ProgressBar::new(cli.trials as u64)
  };
  progress.set_style(
    ProgressStyle::with_template("{bar:40} {pos}/{len} trials [{elapsed_precise}]")
      .context("invalid progress template")?,
  );

  let cancel = CancellationToken::new();
  let deadline = time_limit.map(|limit| Instant::now() + limit);
  let run = engine.run_with(&model, &mut engine.rng(), &cancel, |done| {
    progress.set_position(done as u64);
    if deadline.is_some_and(|d| Instant::now() >= d) {
      cancel.cancel();
    }
  });
  progress.finish_and_clear();
  let report = match run {
    Ok(report) => report,
    Err(PortfolioError::Cancelled { completed }) => {
      anyhow::bail!(
        "time limit reached after {completed} of {} trials; no report was produced, \
         lower --trials or raise --time-limit",
        cli.trials
      )
    }
    Err(err) => return Err(err.into()),
  };

  print_report(&report);

  if let Some(path) = cli.output {
    write_frontier_html(&report, &path)?;
    info!(path = %path.display(), "wrote frontier chart");
  }

  Ok(())
}
