//! Static metadata for the production dropout model.
//!
//! Values come from the backend's training report. They are constants for the
//! lifetime of the process and are not derived from any live call.
//!
//! Validation metrics (hold-out set):
//!   Recall:    0.55
//!   Precision: 0.25
//!   F1:        0.35
//!   ROC-AUC:   0.58
//!   Accuracy:  0.85

use serde::Serialize;

/// Deployment stage of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Production,
    Staging,
    Development,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelMetrics {
    pub recall: f64,
    pub precision: f64,
    pub f1_score: f64,
    pub roc_auc: f64,
    pub accuracy: Option<f64>,
    pub model_name: &'static str,
    pub model_version: &'static str,
    pub training_date: &'static str,
    pub total_predictions: Option<u64>,
    pub features_used: &'static [&'static str],
}

/// Upper probability bounds of each risk band.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RiskThresholds {
    pub low: f64,
    pub medium: f64,
    pub critical: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FeatureImportance {
    pub feature: &'static str,
    pub importance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub algorithm: &'static str,
    pub training_date: &'static str,
    pub status: ModelStatus,
    pub metrics: ModelMetrics,
    pub thresholds: RiskThresholds,
    pub feature_importance: &'static [FeatureImportance],
}

/// Engineered features the model consumes (computed backend-side).
pub const FEATURES_USED: [&str; 9] = [
    "age",
    "days_in_trial",
    "visit_rate",
    "adverse_event_rate",
    "time_since_last_visit",
    "burden",
    "age_adverse_risk",
    "trial_phase_risk",
    "treatment_risk",
];

/// Sorted by importance, descending.
pub const FEATURE_IMPORTANCE: [FeatureImportance; 9] = [
    FeatureImportance { feature: "visit_rate", importance: 0.28 },
    FeatureImportance { feature: "time_since_last_visit", importance: 0.22 },
    FeatureImportance { feature: "adverse_event_rate", importance: 0.18 },
    FeatureImportance { feature: "burden", importance: 0.12 },
    FeatureImportance { feature: "age_adverse_risk", importance: 0.08 },
    FeatureImportance { feature: "days_in_trial", importance: 0.05 },
    FeatureImportance { feature: "trial_phase_risk", importance: 0.04 },
    FeatureImportance { feature: "treatment_risk", importance: 0.02 },
    FeatureImportance { feature: "age", importance: 0.01 },
];

pub static PRODUCTION_MODEL_INFO: ModelInfo = ModelInfo {
    name: "ClinicalTrialDropoutModel",
    version: "2.0.0",
    algorithm: "Logistic Regression (Production)",
    training_date: "2025-12-28",
    status: ModelStatus::Production,
    metrics: ModelMetrics {
        recall: 0.55,
        precision: 0.25,
        f1_score: 0.35,
        roc_auc: 0.58,
        accuracy: Some(0.85),
        model_name: "Logistic Regression",
        model_version: "v_fixed",
        training_date: "2025-12-28",
        total_predictions: Some(0),
        features_used: &FEATURES_USED,
    },
    thresholds: RiskThresholds {
        low: 0.40,
        medium: 0.80,
        critical: 1.0,
    },
    feature_importance: &FEATURE_IMPORTANCE,
};

/// Platform-wide statistics shown on the dashboard.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlatformStats {
    pub total_patients_analyzed: u64,
    pub dropouts_prevented: u64,
    pub cost_saved: f64,
    /// Milliseconds
    pub avg_response_time: u64,
    pub active_trials: u64,
    pub healthcare_partners: u64,
    pub accuracy_rate: f64,
    pub uptime_percent: f64,
}

// Placeholder figures until the backend exposes real usage numbers.
pub const PLATFORM_STATS: PlatformStats = PlatformStats {
    total_patients_analyzed: 0,
    dropouts_prevented: 0,
    cost_saved: 0.0,
    avg_response_time: 100,
    active_trials: 0,
    healthcare_partners: 0,
    accuracy_rate: 0.85,
    uptime_percent: 99.9,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_importance_sorted_and_covers_features() {
        let importances: Vec<f64> = FEATURE_IMPORTANCE.iter().map(|f| f.importance).collect();
        assert!(importances.windows(2).all(|w| w[0] >= w[1]));

        for fi in FEATURE_IMPORTANCE.iter() {
            assert!(FEATURES_USED.contains(&fi.feature), "{} not used", fi.feature);
        }
    }

    #[test]
    fn test_thresholds_ordered() {
        let t = PRODUCTION_MODEL_INFO.thresholds;
        assert!(t.low < t.medium && t.medium <= t.critical);
    }
}
