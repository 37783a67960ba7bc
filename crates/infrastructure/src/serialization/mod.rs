//! Deterministic JSON serialization for run reports.
//!
//! Output is stable across runs of the same suite:
//! - Map keys sorted (via `BTreeMap` in domain types)
//! - 2-space indentation
//! - Trailing newline

mod json;

pub use json::*;
