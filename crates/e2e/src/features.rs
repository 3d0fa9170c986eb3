//! BDD feature definitions and step glue
//!
//! Scenarios are declared in Given/When/Then form; each step pairs its
//! Gherkin text with the browser action that implements it. The greeting
//! service speaks JSON, so assertions check the rendered page body.

/// A named group of scenarios
#[derive(Debug, Clone)]
pub struct FeatureSpec {
    pub name: String,
    pub description: String,
    pub scenarios: Vec<ScenarioSpec>,
}

/// A scenario: ordered steps run in one browser page
#[derive(Debug, Clone)]
pub struct ScenarioSpec {
    pub name: String,
    pub steps: Vec<StepSpec>,
}

/// One Gherkin step and the action behind it
#[derive(Debug, Clone)]
pub struct StepSpec {
    pub keyword: &'static str,
    pub name: String,
    pub action: StepAction,
}

/// Browser actions the harness knows how to execute
#[derive(Debug, Clone)]
pub enum StepAction {
    /// Navigate to a path relative to the service base URL
    Goto { path: String },

    /// Assert the page body contains the given text
    ExpectBody { text: String },
}

fn given(name: &str, action: StepAction) -> StepSpec {
    StepSpec {
        keyword: "Given",
        name: name.to_string(),
        action,
    }
}

fn when(name: &str, action: StepAction) -> StepSpec {
    StepSpec {
        keyword: "When",
        name: name.to_string(),
        action,
    }
}

fn then(name: &str, action: StepAction) -> StepSpec {
    StepSpec {
        keyword: "Then",
        name: name.to_string(),
        action,
    }
}

fn goto(path: &str) -> StepAction {
    StepAction::Goto {
        path: path.to_string(),
    }
}

fn expect_body(text: &str) -> StepAction {
    StepAction::ExpectBody {
        text: text.to_string(),
    }
}

/// All features the suite runs
pub fn all_features() -> Vec<FeatureSpec> {
    vec![greeting_feature()]
}

/// The greeting feature: smoke coverage of the service's public surface
pub fn greeting_feature() -> FeatureSpec {
    FeatureSpec {
        name: "Greeting service".to_string(),
        description: "The greeting service returns personalized greetings over HTTP".to_string(),
        scenarios: vec![
            ScenarioSpec {
                name: "Default greeting".to_string(),
                steps: vec![
                    given("the greeting service is running", goto("/")),
                    then(
                        r#"I should see "Hello World" on the page"#,
                        expect_body("Hello World"),
                    ),
                ],
            },
            ScenarioSpec {
                name: "Personalized greeting".to_string(),
                steps: vec![
                    given("the greeting service is running", goto("/")),
                    when(r#"I request a greeting for "Alice""#, goto("/hello/Alice")),
                    then(
                        r#"I should see "Hello Alice" on the page"#,
                        expect_body("Hello Alice"),
                    ),
                ],
            },
            ScenarioSpec {
                name: "Greeting for a name with spaces".to_string(),
                steps: vec![
                    given("the greeting service is running", goto("/")),
                    when(
                        r#"I request a greeting for "Alice Smith""#,
                        goto("/hello/Alice%20Smith"),
                    ),
                    then(
                        r#"I should see "Hello Alice Smith" on the page"#,
                        expect_body("Hello Alice Smith"),
                    ),
                ],
            },
        ],
    }
}
