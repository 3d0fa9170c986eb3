//! Keystone E2E harness
//!
//! Drives the greeting service end to end:
//! - spawns the `keystone-web` binary as a subprocess and waits for it to
//!   come up
//! - runs each BDD scenario in its own Playwright page via a generated
//!   node script (one page per scenario, closed on every exit path)
//! - captures step screenshots according to `SCREENSHOT_STEPS`
//! - writes the behave-shaped results JSON the report generator consumes

pub mod browser;
pub mod error;
pub mod features;
pub mod runner;
pub mod server;

pub use error::{E2eError, E2eResult};
pub use runner::{Harness, HarnessConfig};
