//! coverage-comment - Post a combined coverage comment to a pull request
//!
//! Reads the backend and frontend LCOV reports, renders the markdown
//! comment, and creates or updates the PR comment through the GitHub API.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use keystone_coverage::github::CommentPublisher;
use keystone_coverage::{lcov, markdown};

#[derive(Parser)]
#[command(name = "coverage-comment")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend LCOV report
    #[arg(long, default_value = "coverage.lcov")]
    backend_lcov: PathBuf,

    /// Frontend LCOV report
    #[arg(long, default_value = "lcov.info")]
    frontend_lcov: PathBuf,

    /// Print the rendered comment to stdout instead of posting it
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    // A missing report yields an empty section rather than an error; one
    // track legitimately runs without the other.
    let backend = lcov::parse_lcov(&args.backend_lcov)?;
    let frontend = lcov::parse_lcov(&args.frontend_lcov)?;

    let comment = markdown::format_comment(&backend, &frontend);

    if args.dry_run {
        println!("{comment}");
        return Ok(());
    }

    let pr_number = std::env::var("PR_NUMBER").context("PR_NUMBER environment variable required")?;
    let token = std::env::var("GITHUB_TOKEN").context("GITHUB_TOKEN environment variable required")?;
    let repo = std::env::var("GITHUB_REPOSITORY")
        .context("GITHUB_REPOSITORY environment variable required")?;

    CommentPublisher::new(repo, token)
        .publish(&pr_number, &comment)
        .await?;

    Ok(())
}
