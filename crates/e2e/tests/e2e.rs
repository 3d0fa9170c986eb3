//! E2E test harness entry point
//!
//! Run with: cargo test --package keystone-e2e --test e2e
//! Requires a built keystone-web binary and a local Playwright install.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use keystone_e2e::server::ServerConfig;
use keystone_e2e::{E2eResult, Harness, HarnessConfig};

#[derive(Parser, Debug)]
#[command(name = "keystone-e2e")]
#[command(about = "E2E harness for the Keystone greeting service")]
struct Args {
    /// Path to the keystone-web binary
    #[arg(long, default_value = "target/debug/keystone-web")]
    server_binary: PathBuf,

    /// Port to run the service on (0 = auto)
    #[arg(long, default_value = "0")]
    port: u16,

    /// Server startup timeout in seconds
    #[arg(long, default_value = "30")]
    startup_timeout: u64,

    /// Where to write the results JSON
    #[arg(short, long, default_value = "reports/behave-results.json")]
    output: PathBuf,

    /// Where to capture step screenshots
    #[arg(long, default_value = "screenshots")]
    screenshots: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    match rt.block_on(async_main(args)) {
        Ok(all_passed) => {
            if all_passed {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> E2eResult<bool> {
    let config = HarnessConfig {
        server: ServerConfig {
            binary_path: args.server_binary,
            port: if args.port == 0 { None } else { Some(args.port) },
            startup_timeout: Duration::from_secs(args.startup_timeout),
        },
        results_path: args.output,
        screenshots_dir: args.screenshots,
    };

    let summary = Harness::new(config).run().await?;
    Ok(summary.failed == 0)
}
