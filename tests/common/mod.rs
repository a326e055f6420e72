//! Common test utilities for the booth CLI and library.
//!
//! - `cli`: CLI runner with output verification and fluent assertions
//! - `env`: serialized environment variable overrides
//! - `fakes`: in-memory rasterizer and download sinks
//! - `fixtures`: camera frames, snapshots and session directories
#![allow(dead_code)]

pub mod env;
pub mod fakes;

use tracing_subscriber::EnvFilter;

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
