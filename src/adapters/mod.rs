//! Adapters layer: Concrete implementations of ports and I/O edges.
//!
//! - `http`: reqwest-backed [`crate::ports::HttpTransport`]
//! - `batch_file`: CSV/JSON cohort parsing
//! - `sanitize`: request payload scrubbing
//! - `log_redact`: secret and patient-ID filtering for logs

pub mod batch_file;
pub mod http;
pub mod log_redact;
pub mod sanitize;

pub use http::ReqwestTransport;
