//! Authentication domain types

mod types;

pub use types::{AUTHORIZATION, AuthMode, BasicAuth, Credentials};
