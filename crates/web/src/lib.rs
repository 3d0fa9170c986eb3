//! Keystone greeting service
//!
//! A deliberately tiny HTTP surface used as the target for the E2E harness
//! and CI smoke tests.

pub mod server;
