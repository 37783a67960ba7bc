//! Application use cases (business logic orchestration).

mod run_scenario;
mod run_suite;

pub use run_scenario::*;
pub use run_suite::*;
