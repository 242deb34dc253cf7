//! # Trialguard
//!
//! Clinical-trial dropout risk dashboard.
//!
//! This crate provides:
//! - A client-side request pipeline to a remote dropout prediction service
//!   (validation, sanitization, rate limiting, batch fan-out)
//! - Cohort file ingestion (CSV / JSON)
//! - Terminal UI for single and batch risk assessment
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (PatientRecord, PredictionResult, ModelInfo)
//! - `ports`: Trait definitions for external operations (HTTP transport)
//! - `adapters`: Concrete implementations (reqwest, sanitizer, file parsing)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{HealthStatus, PatientRecord, PredictionResult, RiskLevel};

/// Result type for Trialguard operations
pub type Result<T> = std::result::Result<T, TrialguardError>;

/// Main error type for Trialguard.
///
/// Variants carrying a message display only that message: it is what the
/// UI shows to the user.
#[derive(Debug, thiserror::Error)]
pub enum TrialguardError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    AuthFailed(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Unreachable(String),

    #[error("Batch size exceeds maximum of {max} patients")]
    BatchTooLarge { size: usize, max: usize },

    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    ParseFailure(String),

    /// Non-2xx response that no normalization rule covers.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
