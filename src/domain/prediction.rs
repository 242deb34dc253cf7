//! Prediction result types.
//!
//! Represents the output of the remote dropout-risk model.

use serde::{Deserialize, Serialize};

use super::model_info::ModelInfo;
use super::patient::FieldFallback;

/// Risk level classification for patient dropout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Patient likely to stay in the trial
    Low,
    /// Elevated dropout risk, follow-up recommended
    Medium,
    /// Dropout likely, intervention recommended
    Critical,
}

impl RiskLevel {
    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - Continue standard monitoring",
            Self::Medium => "Medium risk - Schedule a retention check-in",
            Self::Critical => "Critical risk - Immediate retention intervention advised",
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129),     // Emerald (#10B981)
            Self::Medium => (251, 191, 36),  // Amber (#FBBF24)
            Self::Critical => (244, 63, 94), // Rose (#F43F5E)
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Prediction for one patient as returned by `POST /predict`.
///
/// `model_used` and `confidence` are never sent by the backend; they are
/// filled from static model metadata by [`PredictionResult::enrich`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub patient_id: String,

    /// Binary prediction (0 = stays, 1 = drops out)
    pub dropout_prediction: f64,

    /// Predicted dropout probability (0.0 to 1.0)
    pub dropout_probability: f64,

    pub risk_level: RiskLevel,

    pub recommended_action: String,

    /// Estimated cost of the recommended intervention
    pub intervention_cost: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Input values that were replaced by defaults before the request.
    #[serde(skip)]
    pub fallbacks: Vec<FieldFallback>,
}

impl PredictionResult {
    /// Attach static model metadata.
    ///
    /// The confidence is the model's ROC-AUC, a constant; it says nothing
    /// about this particular prediction.
    #[must_use]
    pub fn enrich(mut self, model: &ModelInfo) -> Self {
        self.model_used = Some(model.algorithm.to_string());
        self.confidence = Some(model.metrics.roc_auc);
        self
    }

    /// Record which input fields were substituted during mapping.
    #[must_use]
    pub fn with_fallbacks(mut self, fallbacks: Vec<FieldFallback>) -> Self {
        self.fallbacks = fallbacks;
        self
    }
}

/// Outcome of a batch run: one entry per submitted record, in input order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<crate::Result<PredictionResult>>,
}

/// Aggregate counts over a batch outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub low: usize,
    pub medium: usize,
    pub critical: usize,
    /// Successful records sent with at least one defaulted field
    pub defaulted: usize,
    pub total_intervention_cost: f64,
}

impl BatchOutcome {
    /// Count results by risk level and failures.
    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total: self.results.len(),
            ..BatchSummary::default()
        };

        for result in &self.results {
            match result {
                Ok(prediction) => {
                    summary.succeeded += 1;
                    summary.total_intervention_cost += prediction.intervention_cost;
                    if !prediction.fallbacks.is_empty() {
                        summary.defaulted += 1;
                    }
                    match prediction.risk_level {
                        RiskLevel::Low => summary.low += 1,
                        RiskLevel::Medium => summary.medium += 1,
                        RiskLevel::Critical => summary.critical += 1,
                    }
                }
                Err(_) => summary.failed += 1,
            }
        }

        summary
    }
}
