//! Playwright browser automation
//!
//! Each scenario runs in a generated node script that launches its own
//! browser and page, executes the steps, and reports one JSON line per
//! step on stdout. The page and browser are closed in a `finally` block,
//! so the per-scenario resources are released on both success and failure
//! paths. Screenshot file names are computed here in Rust with the shared
//! sanitizer and embedded into the script verbatim, which keeps capture
//! and report lookup on the exact same naming rule.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::Deserialize;
use tokio::process::Command as TokioCommand;
use tracing::debug;

use keystone_common::results::{Step, StepOutcome, StepStatus};
use keystone_common::sanitize::{sanitize_filename, screenshot_stem};

use crate::error::{E2eError, E2eResult};
use crate::features::{ScenarioSpec, StepAction, StepSpec};

/// When step screenshots are captured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScreenshotMode {
    /// Capture every step
    All,
    /// Capture only "Then" steps
    #[default]
    Then,
    /// No step screenshots
    Off,
}

impl ScreenshotMode {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "all" => Self::All,
            "then" => Self::Then,
            // Anything else (including "false") disables step captures
            _ => Self::Off,
        }
    }

    fn captures(&self, keyword: &str) -> bool {
        match self {
            Self::All => true,
            Self::Then => keyword.trim().eq_ignore_ascii_case("then"),
            Self::Off => false,
        }
    }
}

/// Configuration for the browser harness
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub base_url: String,
    pub screenshots_dir: PathBuf,
    pub headless: bool,
    pub screenshot_mode: ScreenshotMode,
}

impl BrowserConfig {
    /// Honors `HEADLESS` (default true) and `SCREENSHOT_STEPS`
    /// (all | then | false, default then).
    pub fn from_env(base_url: String, screenshots_dir: PathBuf) -> Self {
        let headless = std::env::var("HEADLESS")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(true);
        let screenshot_mode = std::env::var("SCREENSHOT_STEPS")
            .map(|v| ScreenshotMode::parse(&v))
            .unwrap_or_default();
        Self {
            base_url,
            screenshots_dir,
            headless,
            screenshot_mode,
        }
    }
}

/// Per-step line emitted by the generated script
#[derive(Debug, Deserialize)]
struct StepReport {
    index: usize,
    status: String,
    #[serde(default)]
    error: Option<String>,
}

/// Runs scenarios through Playwright under node
pub struct BrowserHarness {
    config: BrowserConfig,
}

impl BrowserHarness {
    pub fn new(config: BrowserConfig) -> E2eResult<Self> {
        Self::check_playwright_installed()?;
        std::fs::create_dir_all(&config.screenshots_dir)?;
        Ok(Self { config })
    }

    /// Check if Playwright is installed
    fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Run one scenario in its own page and return the step results.
    pub async fn run_scenario(&self, scenario: &ScenarioSpec) -> E2eResult<Vec<Step>> {
        let script = self.build_script(scenario);

        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("scenario.js");
        std::fs::write(&script_path, &script)?;

        debug!("Running scenario script: {}", script_path.display());

        let output = TokioCommand::new("node").arg(&script_path).output().await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut reports: HashMap<usize, StepReport> = HashMap::new();
        for line in stdout.lines() {
            if let Ok(report) = serde_json::from_str::<StepReport>(line) {
                reports.insert(report.index, report);
            }
        }

        if reports.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(E2eError::Browser(format!(
                "scenario '{}' produced no step results:\nstdout: {}\nstderr: {}",
                scenario.name, stdout, stderr
            )));
        }

        Ok(scenario
            .steps
            .iter()
            .enumerate()
            .map(|(i, spec)| assemble_step(spec, reports.remove(&i)))
            .collect())
    }

    /// Build the node script for a scenario.
    pub fn build_script(&self, scenario: &ScenarioSpec) -> String {
        let mut script = String::new();

        // Header
        script.push_str(&format!(
            r#"const {{ chromium }} = require('playwright');

(async () => {{
  const browser = await chromium.launch({{ headless: {headless} }});
  const page = await browser.newPage();
  const report = (r) => console.log(JSON.stringify(r));
  let failed = false;
  try {{
"#,
            headless = self.config.headless,
        ));

        let failure_shot = self
            .config
            .screenshots_dir
            .join(format!("{}_FAILED.png", sanitize_filename(&scenario.name)));

        for (i, step) in scenario.steps.iter().enumerate() {
            script.push_str(&format!(
                "\n    // Step {}: {} {}\n",
                i + 1,
                step.keyword,
                step.name
            ));
            // Step-named capture applies on both outcomes so a failed Then
            // step's screenshot still lands under the name the report
            // generator looks up
            let step_shot = self
                .config
                .screenshot_mode
                .captures(step.keyword)
                .then(|| {
                    let path = self.config.screenshots_dir.join(format!(
                        "{}.png",
                        screenshot_stem(&scenario.name, step.keyword, &step.name)
                    ));
                    js_str(&path.to_string_lossy())
                });

            script.push_str("    if (!failed) {\n      try {\n");
            script.push_str(&self.action_to_js(&step.action));
            script.push_str(&format!(
                "        report({{ index: {i}, status: 'passed' }});\n"
            ));
            if let Some(shot) = &step_shot {
                script.push_str(&format!(
                    "        await page.screenshot({{ path: {shot} }});\n"
                ));
            }
            script.push_str(&format!(
                r#"      }} catch (error) {{
        failed = true;
        report({{ index: {i}, status: 'failed', error: String((error && error.message) || error) }});
"#
            ));
            if let Some(shot) = &step_shot {
                script.push_str(&format!(
                    "        await page.screenshot({{ path: {shot} }}).catch(() => {{}});\n"
                ));
            }
            script.push_str(&format!(
                r#"        await page.screenshot({{ path: {failure_shot} }}).catch(() => {{}});
      }}
    }}
"#,
                failure_shot = js_str(&failure_shot.to_string_lossy()),
            ));
        }

        // Footer: the page is released on every exit path
        script.push_str(
            r#"
    process.exitCode = failed ? 1 : 0;
  } finally {
    await page.close();
    await browser.close();
  }
})();
"#,
        );

        script
    }

    fn action_to_js(&self, action: &StepAction) -> String {
        match action {
            StepAction::Goto { path } => {
                let url = format!("{}{}", self.config.base_url, path);
                format!("        await page.goto({});\n", js_str(&url))
            }
            StepAction::ExpectBody { text } => {
                let needle = js_str(text);
                format!(
                    r#"        const body = await page.textContent('body');
        if (!body || !body.includes({needle})) {{
          throw new Error('expected page body to contain ' + {needle} + ', got: ' + body);
        }}
"#
                )
            }
        }
    }
}

fn assemble_step(spec: &StepSpec, report: Option<StepReport>) -> Step {
    // No report line means the step never ran; leave the result empty so it
    // reads back as skipped.
    let result = report.map(|r| StepOutcome {
        status: match r.status.as_str() {
            "passed" => StepStatus::Passed,
            "failed" => StepStatus::Failed,
            _ => StepStatus::Unknown,
        },
        error_message: r.error,
    });

    Step {
        keyword: spec.keyword.to_string(),
        name: spec.name.clone(),
        result,
    }
}

/// Quote a string as a single-quoted JavaScript literal.
fn js_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\'' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::greeting_feature;

    fn harness(mode: ScreenshotMode) -> BrowserHarness {
        BrowserHarness {
            config: BrowserConfig {
                base_url: "http://127.0.0.1:4242".to_string(),
                screenshots_dir: PathBuf::from("screenshots"),
                headless: true,
                screenshot_mode: mode,
            },
        }
    }

    #[test]
    fn test_js_str_escapes_quotes() {
        assert_eq!(js_str(r#"it's a \ test"#), r#"'it\'s a \\ test'"#);
        assert_eq!(js_str("line\nbreak"), r#"'line\nbreak'"#);
    }

    #[test]
    fn test_screenshot_mode_parsing() {
        assert_eq!(ScreenshotMode::parse("all"), ScreenshotMode::All);
        assert_eq!(ScreenshotMode::parse("ALL"), ScreenshotMode::All);
        assert_eq!(ScreenshotMode::parse("false"), ScreenshotMode::Off);
        assert_eq!(ScreenshotMode::parse("then"), ScreenshotMode::Then);
        assert_eq!(ScreenshotMode::parse("THEN"), ScreenshotMode::Then);
        // Out-of-domain values disable captures rather than guessing
        assert_eq!(ScreenshotMode::parse("anything"), ScreenshotMode::Off);
        assert_eq!(ScreenshotMode::parse(""), ScreenshotMode::Off);
    }

    #[test]
    fn test_screenshot_mode_captures() {
        assert!(ScreenshotMode::All.captures("Given"));
        assert!(ScreenshotMode::Then.captures("Then"));
        assert!(!ScreenshotMode::Then.captures("Given"));
        assert!(!ScreenshotMode::Off.captures("Then"));
    }

    #[test]
    fn test_build_script_navigates_and_screenshots_then_steps() {
        let feature = greeting_feature();
        let scenario = &feature.scenarios[1]; // Personalized greeting
        let script = harness(ScreenshotMode::Then).build_script(scenario);

        assert!(script.contains("page.goto('http://127.0.0.1:4242/hello/Alice')"));
        // Only the Then step gets a named screenshot in the default mode,
        // once on the success path and once in its catch block
        let stem = "Personalized_greeting_Then_I_should_see_Hello_Alice_on_the_page.png";
        assert_eq!(script.matches(stem).count(), 2);
        // Every step's catch block also captures the scenario failure shot
        assert_eq!(
            script.matches("Personalized_greeting_FAILED.png").count(),
            scenario.steps.len()
        );
    }

    #[test]
    fn test_failed_then_step_still_gets_named_screenshot() {
        let feature = greeting_feature();
        let scenario = &feature.scenarios[1]; // Personalized greeting
        let script = harness(ScreenshotMode::Then).build_script(scenario);

        // The failure-path capture is the one guarded with .catch(); the
        // report generator looks the file up under the same stem either way
        let guarded = "Personalized_greeting_Then_I_should_see_Hello_Alice_on_the_page.png' }).catch(";
        assert!(script.contains(guarded));
    }

    #[test]
    fn test_build_script_always_releases_the_page() {
        let feature = greeting_feature();
        let script = harness(ScreenshotMode::Off).build_script(&feature.scenarios[0]);

        assert!(script.contains("} finally {"));
        assert!(script.contains("await page.close();"));
        assert!(script.contains("await browser.close();"));
    }

    #[test]
    fn test_assemble_step_missing_report_is_skipped() {
        let spec = StepSpec {
            keyword: "Then",
            name: "never ran".to_string(),
            action: StepAction::ExpectBody {
                text: "x".to_string(),
            },
        };
        let step = assemble_step(&spec, None);
        assert_eq!(step.status(), StepStatus::Skipped);
        assert!(step.result.is_none());
    }

    #[test]
    fn test_assemble_step_failed_report() {
        let spec = StepSpec {
            keyword: "Then",
            name: "broken".to_string(),
            action: StepAction::ExpectBody {
                text: "x".to_string(),
            },
        };
        let step = assemble_step(
            &spec,
            Some(StepReport {
                index: 0,
                status: "failed".to_string(),
                error: Some("boom".to_string()),
            }),
        );
        assert_eq!(step.status(), StepStatus::Failed);
        assert_eq!(step.error_message(), Some("boom"));
    }
}
