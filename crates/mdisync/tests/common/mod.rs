//! Shared test utilities for mdisync integration tests.
//!
//! This module provides:
//! - `TestHarness` owning a temp project tree and an in-memory store
//! - Builders for project configs and report sheets

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
