//! Vouch Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration loading and
//! report output.

pub mod adapters;
pub mod config;
pub mod reporting;
pub mod serialization;

pub use adapters::{ReqwestHttpClient, SystemClock};
pub use crate::config::{ConfigError, ConfigLoader};
pub use reporting::{ConsoleReporter, JsonReportWriter, ReportError};
pub use serialization::{SerializationError, from_json, to_json_stable};
