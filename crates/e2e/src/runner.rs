//! Suite orchestration: server + browser + results file

use std::path::PathBuf;

use tracing::{error, info};

use keystone_common::results::{Feature, Scenario, SuiteSummary};

use crate::browser::{BrowserConfig, BrowserHarness};
use crate::error::E2eResult;
use crate::features::{all_features, FeatureSpec};
use crate::server::{ServerConfig, ServerHandle};

/// Configuration for a full suite run
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub server: ServerConfig,
    /// Where the behave-shaped results JSON is written
    pub results_path: PathBuf,
    /// Where step screenshots are captured
    pub screenshots_dir: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            results_path: PathBuf::from("reports/behave-results.json"),
            screenshots_dir: PathBuf::from("screenshots"),
        }
    }
}

/// Drives the whole suite against a freshly spawned service
pub struct Harness {
    config: HarnessConfig,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Run every feature, write the results file, and return the summary.
    pub async fn run(&self) -> E2eResult<SuiteSummary> {
        let mut server = ServerHandle::spawn(self.config.server.clone()).await?;

        let browser = BrowserHarness::new(BrowserConfig::from_env(
            server.base_url().to_string(),
            self.config.screenshots_dir.clone(),
        ))?;

        let specs = all_features();
        let mut features = Vec::with_capacity(specs.len());
        for spec in &specs {
            features.push(self.run_feature(&browser, spec).await?);
        }

        server.stop()?;

        self.write_results(&features)?;

        let summary = SuiteSummary::of(&features);
        info!(
            "Suite finished: {} passed, {} failed ({} scenarios)",
            summary.passed, summary.failed, summary.total
        );
        Ok(summary)
    }

    async fn run_feature(
        &self,
        browser: &BrowserHarness,
        spec: &FeatureSpec,
    ) -> E2eResult<Feature> {
        let mut elements = Vec::with_capacity(spec.scenarios.len());

        for scenario in &spec.scenarios {
            let steps = browser.run_scenario(scenario).await?;
            let result = Scenario {
                name: scenario.name.clone(),
                description: String::new(),
                steps,
            };
            if result.passed() {
                info!("PASS {}", result.name);
            } else {
                error!("FAIL {}", result.name);
            }
            elements.push(result);
        }

        Ok(Feature {
            name: spec.name.clone(),
            description: spec.description.clone(),
            elements,
        })
    }

    fn write_results(&self, features: &[Feature]) -> E2eResult<()> {
        if let Some(parent) = self.config.results_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(features)?;
        std::fs::write(&self.config.results_path, json)?;
        info!("Results written to: {}", self.config.results_path.display());
        Ok(())
    }
}
