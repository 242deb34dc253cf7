//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (the prediction backend).

mod transport;

pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

#[cfg(test)]
pub(crate) use transport::fake;
