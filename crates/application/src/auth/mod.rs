//! Authentication for outgoing requests.

mod injector;

pub use injector::AuthInjector;
