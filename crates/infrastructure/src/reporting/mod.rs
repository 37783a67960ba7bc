//! Run report output: a console summary and a JSON report file.

mod console;
mod json;

pub use console::ConsoleReporter;
pub use json::{JsonReportWriter, ReportError};
