//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the harness core and external systems.
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod clock;
mod http_client;

pub use clock::Clock;
pub use http_client::{HttpClient, NetworkError, ResponseFuture};
