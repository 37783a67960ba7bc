//! Vouch - Main Entry Point
//!
//! Runs the books contract suite against the configured server and exits
//! non-zero if any scenario failed.
//!
//! Usage: `vouch [config-file]`

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::error;
use vouch::{BooksSuite, load_config, logging, render, run};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init_tracing();

    let file = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match load_config(file) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::from(2);
        }
    };

    match run(&config, &BooksSuite::new()).await {
        Ok(report) => {
            print!("{}", render(&report));
            ExitCode::from(report.exit_code())
        }
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::from(2)
        }
    }
}
