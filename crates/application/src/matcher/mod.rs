//! Response body matching.

mod engine;

pub use engine::BodyMatcher;
