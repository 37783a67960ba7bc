//! Vouch Application - Harness orchestration
//!
//! This crate defines the ports the harness needs from the outside world
//! and the logic that runs scenarios through them: auth injection, body
//! matching, template resolution and the scenario runner.

pub mod auth;
pub mod error;
pub mod matcher;
pub mod ports;
pub mod use_cases;
pub mod variable_resolver;

pub use auth::AuthInjector;
pub use error::{ApplicationError, ApplicationResult};
pub use matcher::BodyMatcher;
pub use ports::{Clock, HttpClient, NetworkError, ResponseFuture};
pub use use_cases::{RunSuite, ScenarioRunner, Suite};
pub use variable_resolver::{ResolutionResult, VariableResolver};
