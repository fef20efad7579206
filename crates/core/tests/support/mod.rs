//! Shared test helpers for `carebook-core` integration tests.
//!
//! Fixtures build a small roster on a known week (Monday 2024-05-06) and the
//! mock repository stands in for persistence.

#![allow(dead_code)]

pub mod fixtures;
pub mod repositories;
