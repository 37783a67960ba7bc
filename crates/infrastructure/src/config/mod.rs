//! Harness configuration loading.

mod loader;

pub use loader::{CONFIG_FILE_ENV, ConfigError, ConfigLoader};
