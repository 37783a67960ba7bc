//! Response testing and assertions.
//!
//! This module provides types for defining checks on HTTP responses and
//! for recording what happened when they ran.

mod assertion;
mod outcome;
mod path;

pub use assertion::{
    Assertion, AssertionResult, AssertionStatus, Predicate, StatusCheck, StatusExpectation,
};
pub use outcome::{
    OutcomeStatus, RunReport, RunTotals, ScenarioOutcome, StepError, StepOutcome,
};
pub use path::{BodyPath, PathSegment, Unresolved, kind_of};
