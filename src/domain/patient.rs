//! Patient record types for dropout risk prediction.
//!
//! Two shapes exist: [`PatientRecord`] holds what the form or a cohort file
//! produced, verbatim, and [`BackendPatientRecord`] is the validated form the
//! prediction service accepts.

use serde::{Deserialize, Deserializer, Serialize};

/// Raw patient record as entered in the TUI or read from a cohort file.
///
/// Enum-like fields use the UI vocabulary (`male`, `phase_2`, `treatment_a`).
/// Numeric fields keep whatever was supplied; a value that could not be read
/// as a number is carried as NaN and rejected during mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(default)]
    pub patient_id: String,

    #[serde(default = "missing_number", deserialize_with = "lenient_number")]
    pub age: f64,

    #[serde(default)]
    pub gender: String,

    #[serde(default)]
    pub trial_phase: String,

    #[serde(default)]
    pub treatment_group: String,

    #[serde(default = "missing_number", deserialize_with = "lenient_number")]
    pub days_in_trial: f64,

    #[serde(default = "missing_number", deserialize_with = "lenient_number")]
    pub visits_completed: f64,

    /// Day of the most recent visit; derived from `days_in_trial` when absent.
    #[serde(default, deserialize_with = "lenient_optional_number")]
    pub last_visit_day: Option<f64>,

    #[serde(default = "missing_number", deserialize_with = "lenient_number")]
    pub adverse_events: f64,
}

impl PatientRecord {
    /// Create a record with every field blank and every number missing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            patient_id: String::new(),
            age: f64::NAN,
            gender: String::new(),
            trial_phase: String::new(),
            treatment_group: String::new(),
            days_in_trial: f64::NAN,
            visits_completed: f64::NAN,
            last_visit_day: None,
            adverse_events: f64::NAN,
        }
    }
}

fn missing_number() -> f64 {
    f64::NAN
}

/// Accepts a JSON number or a numeric string. Anything else becomes NaN so
/// the validator can reject it with a user-facing message instead of the
/// whole file failing to load.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(number_from_value(&value).unwrap_or(f64::NAN))
}

fn lenient_optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(number_from_value(&value).unwrap_or(f64::NAN)))
}

fn number_from_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Gender in backend vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    #[serde(rename = "Non-binary")]
    NonBinary,
}

/// Trial phase in backend vocabulary. The backend has no Phase IV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialPhase {
    #[serde(rename = "Phase I")]
    PhaseI,
    #[serde(rename = "Phase II")]
    PhaseII,
    #[serde(rename = "Phase III")]
    PhaseIII,
}

/// Treatment group in backend vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreatmentGroup {
    Active,
    Control,
    Placebo,
}

/// Validated record in the shape `POST /predict` expects.
///
/// Every field is inside the domain the backend accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendPatientRecord {
    /// Sanitized, at most 50 characters.
    pub patient_id: String,
    /// 18..=100
    pub age: u32,
    pub gender: Gender,
    pub trial_phase: TrialPhase,
    pub treatment_group: TreatmentGroup,
    /// 1..=10000
    pub days_in_trial: u32,
    /// 0..=1000
    pub visits_completed: u32,
    /// 0..=10000
    pub last_visit_day: u32,
    /// 0..=100
    pub adverse_events: u32,
}

/// An enum field whose value was not recognized and was replaced by the
/// backend default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFallback {
    pub field: &'static str,
    pub value: String,
    pub substituted: &'static str,
}

impl std::fmt::Display for FieldFallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?} -> {}", self.field, self.value, self.substituted)
    }
}
