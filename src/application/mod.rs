//! Application layer: Use cases and services.
//!
//! This module drives the ports to implement the prediction pipeline:
//! mapping, rate limiting, the API client and the services built on it.

pub mod client;
mod health_monitor;
pub mod mapper;
mod prediction;
mod rate_limit;

pub use client::ApiClient;
pub use health_monitor::{HealthMonitor, HealthMonitorHandle, HealthReport};
pub use mapper::{map_patient, MappedPatient};
pub use prediction::{PredictionService, MAX_BATCH_SIZE};
