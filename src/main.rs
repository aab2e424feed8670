//! Laptop Insight - laptop listings CSV analysis & chart report generator
//!
//! Batch pipeline over a listings CSV: load, clean, print descriptive
//! statistics, write the chart images.

mod charts;
mod data;
mod report;
mod stats;

use anyhow::Context;
use data::{DataCleaner, DataLoader};
use report::{ReportConfig, Reporter};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

const DATA_PATH: &str = "data/laptop.csv";

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("analysis aborted: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let data_path = Path::new(DATA_PATH);

    let mut loader = DataLoader::new();
    let raw = loader
        .load_csv(data_path)
        .with_context(|| format!("loading {}", data_path.display()))?;

    let cleaned = DataCleaner::new()
        .clean(raw)
        .context("cleaning listings")?;
    info!(rows = cleaned.height(), "listings cleaned");

    let reporter = Reporter::new(ReportConfig::default());
    reporter.run(&cleaned).context("building report")?;

    info!("analysis complete");
    Ok(())
}
