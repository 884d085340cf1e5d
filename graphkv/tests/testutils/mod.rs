//! Test utilities for graphkv integration tests
//!
//! `GraphFixture` opens a uniquely named graph over either an in-memory store
//! or a sled store in a temporary directory, so tests never share state.

#![allow(dead_code)]

pub mod graph_fixture;

/// Route `log` output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
