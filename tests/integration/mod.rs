//! Integration test suite for Uplift
//!
//! End-to-end tests against a local HTTP server (wiremock) and the compiled
//! `uplift` binary. No test reaches the public network.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **checker**: Release selection over the GitHub-compatible HTTP source
//! - **download**: Download state machine, cancellation and validation
//! - **cli**: The `uplift` binary with isolated configuration

mod checker;
mod cli;
mod download;
