//! Vouch Domain - Core harness types
//!
//! This crate defines the domain model for the Vouch HTTP contract-test
//! harness. All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod scenario;
pub mod state;
pub mod testing;

pub use auth::{AuthMode, BasicAuth, Credentials};
pub use config::{BodyPolicy, HarnessConfig};
pub use error::{DomainError, DomainResult, MalformedResponse};
pub use scenario::{Capture, Scenario, Step};
pub use state::ScenarioState;
pub use testing::{
    Assertion, AssertionResult, AssertionStatus, BodyPath, OutcomeStatus, Predicate, RunReport,
    ScenarioOutcome, StatusCheck, StatusExpectation, StepError, StepOutcome,
};
