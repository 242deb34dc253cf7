//! Backend health status.

use serde::{Deserialize, Serialize};

/// Status reported by `GET /health`, plus the measured round-trip latency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,

    pub model_loaded: bool,

    #[serde(default)]
    pub model_path: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    /// Round-trip time in milliseconds, measured client-side.
    #[serde(default)]
    pub latency: Option<u64>,
}

impl HealthStatus {
    /// Synthetic status used when the backend could not be reached.
    #[must_use]
    pub fn offline(latency_ms: u64) -> Self {
        Self {
            status: "offline".to_string(),
            model_loaded: false,
            model_path: None,
            version: None,
            latency: Some(latency_ms),
        }
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        matches!(self.status.as_str(), "healthy" | "online")
    }
}
