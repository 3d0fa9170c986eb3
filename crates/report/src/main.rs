//! test-report - Generate the PDF test report
//!
//! Parses the E2E results JSON and embeds step screenshots to produce a
//! report suitable for change-management sign-off.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use keystone_report::{load_results, pdf};

#[derive(Parser)]
#[command(name = "test-report")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// E2E results JSON written by the harness
    #[arg(long, default_value = "reports/behave-results.json")]
    results: PathBuf,

    /// Directory holding step screenshots
    #[arg(long, default_value = "screenshots")]
    screenshots: PathBuf,

    /// Output PDF path
    #[arg(long, default_value = "reports/test-report.pdf")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    if !args.results.exists() {
        anyhow::bail!(
            "test results not found at {} - run the E2E suite first to produce them",
            args.results.display()
        );
    }

    let features = load_results(&args.results)?;
    pdf::generate(&features, &args.screenshots, &args.output)?;

    info!("PDF report generated: {}", args.output.display());
    Ok(())
}
