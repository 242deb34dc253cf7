//! Mapping of UI patient records into the backend's vocabulary.
//!
//! Numeric fields are clamped into the ranges the backend accepts; a value
//! that is not a finite number is the only hard failure. Enum fields go
//! through fixed lookup tables, and values missing from a table fall back
//! to a default. Fallbacks are returned with the record and end up on the
//! prediction result, where the UI lists them.

use crate::adapters::sanitize::sanitize_str;
use crate::domain::{
    BackendPatientRecord, FieldFallback, Gender, PatientRecord, TreatmentGroup, TrialPhase,
};
use crate::{Result, TrialguardError};

pub const MAX_PATIENT_ID_CHARS: usize = 50;

pub const AGE_RANGE: (f64, f64) = (18.0, 100.0);
pub const DAYS_IN_TRIAL_RANGE: (f64, f64) = (1.0, 10_000.0);
pub const VISITS_COMPLETED_RANGE: (f64, f64) = (0.0, 1_000.0);
pub const LAST_VISIT_DAY_RANGE: (f64, f64) = (0.0, 10_000.0);
pub const ADVERSE_EVENTS_RANGE: (f64, f64) = (0.0, 100.0);

/// Days subtracted from `days_in_trial` when no last visit day is given.
const DEFAULT_VISIT_GAP_DAYS: f64 = 5.0;

pub const GENDER_DEFAULT: Gender = Gender::Male;
pub const PHASE_DEFAULT: TrialPhase = TrialPhase::PhaseII;
pub const GROUP_DEFAULT: TreatmentGroup = TreatmentGroup::Control;

const GENDER_TABLE: [(&str, Gender); 3] = [
    ("male", Gender::Male),
    ("female", Gender::Female),
    ("other", Gender::NonBinary),
];

// No Phase IV on the backend: phase_4 is treated as Phase III.
const PHASE_TABLE: [(&str, TrialPhase); 4] = [
    ("phase_1", TrialPhase::PhaseI),
    ("phase_2", TrialPhase::PhaseII),
    ("phase_3", TrialPhase::PhaseIII),
    ("phase_4", TrialPhase::PhaseIII),
];

const GROUP_TABLE: [(&str, TreatmentGroup); 4] = [
    ("control", TreatmentGroup::Control),
    ("treatment_a", TreatmentGroup::Active),
    ("treatment_b", TreatmentGroup::Active),
    ("placebo", TreatmentGroup::Placebo),
];

/// A mapped record together with any defaults applied on the way.
#[derive(Debug, Clone)]
pub struct MappedPatient {
    pub record: BackendPatientRecord,
    pub fallbacks: Vec<FieldFallback>,
}

/// Clamp `value` into `[min, max]`.
///
/// # Errors
/// Returns `InvalidInput` if `value` is NaN or infinite.
pub fn validate_number(value: f64, min: f64, max: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(TrialguardError::InvalidInput("Invalid numeric value".to_string()));
    }
    Ok(value.clamp(min, max))
}

fn wire_int(value: f64) -> u32 {
    // Already clamped into a non-negative range well inside u32.
    value.round() as u32
}

fn lookup<T: Copy>(table: &[(&str, T)], value: &str) -> Option<T> {
    table.iter().find(|(key, _)| *key == value).map(|(_, v)| *v)
}

#[must_use]
pub fn map_gender(value: &str) -> Gender {
    lookup(&GENDER_TABLE, value).unwrap_or(GENDER_DEFAULT)
}

#[must_use]
pub fn map_trial_phase(value: &str) -> TrialPhase {
    lookup(&PHASE_TABLE, value).unwrap_or(PHASE_DEFAULT)
}

#[must_use]
pub fn map_treatment_group(value: &str) -> TreatmentGroup {
    lookup(&GROUP_TABLE, value).unwrap_or(GROUP_DEFAULT)
}

/// Map a record and report which enum fields fell back to defaults.
///
/// # Errors
/// Returns `InvalidInput` if any numeric field is not a finite number.
pub fn map_patient(input: &PatientRecord) -> Result<MappedPatient> {
    let mut fallbacks = Vec::new();
    let mut note = |field: &'static str, value: &str, known: bool, substituted: &'static str| {
        if !known {
            fallbacks.push(FieldFallback {
                field,
                value: value.to_string(),
                substituted,
            });
        }
    };

    let gender = map_gender(&input.gender);
    note("gender", &input.gender, lookup(&GENDER_TABLE, &input.gender).is_some(), "Male");
    let trial_phase = map_trial_phase(&input.trial_phase);
    note(
        "trial_phase",
        &input.trial_phase,
        lookup(&PHASE_TABLE, &input.trial_phase).is_some(),
        "Phase II",
    );
    let treatment_group = map_treatment_group(&input.treatment_group);
    note(
        "treatment_group",
        &input.treatment_group,
        lookup(&GROUP_TABLE, &input.treatment_group).is_some(),
        "Control",
    );

    let age = validate_number(input.age, AGE_RANGE.0, AGE_RANGE.1)?;
    let days_in_trial = validate_number(input.days_in_trial, DAYS_IN_TRIAL_RANGE.0, DAYS_IN_TRIAL_RANGE.1)?;
    let visits_completed = validate_number(
        input.visits_completed,
        VISITS_COMPLETED_RANGE.0,
        VISITS_COMPLETED_RANGE.1,
    )?;
    let adverse_events = validate_number(input.adverse_events, ADVERSE_EVENTS_RANGE.0, ADVERSE_EVENTS_RANGE.1)?;
    let last_visit_day = match input.last_visit_day {
        Some(day) => validate_number(day, LAST_VISIT_DAY_RANGE.0, LAST_VISIT_DAY_RANGE.1)?,
        None => (days_in_trial - DEFAULT_VISIT_GAP_DAYS).max(0.0),
    };

    let patient_id: String = sanitize_str(&input.patient_id)
        .chars()
        .take(MAX_PATIENT_ID_CHARS)
        .collect();

    for fallback in &fallbacks {
        tracing::warn!(
            field = fallback.field,
            substituted = fallback.substituted,
            "Unrecognized value {:?}, using default",
            fallback.value
        );
    }

    Ok(MappedPatient {
        record: BackendPatientRecord {
            patient_id,
            age: wire_int(age),
            gender,
            trial_phase,
            treatment_group,
            days_in_trial: wire_int(days_in_trial),
            visits_completed: wire_int(visits_completed),
            last_visit_day: wire_int(last_visit_day),
            adverse_events: wire_int(adverse_events),
        },
        fallbacks,
    })
}

/// Map a record into the form `POST /predict` accepts.
///
/// # Errors
/// Returns `InvalidInput` if any numeric field is not a finite number.
pub fn to_backend_record(input: &PatientRecord) -> Result<BackendPatientRecord> {
    map_patient(input).map(|mapped| mapped.record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PatientRecord {
        PatientRecord {
            patient_id: "P-1".to_string(),
            age: 45.0,
            gender: "male".to_string(),
            trial_phase: "phase_1".to_string(),
            treatment_group: "control".to_string(),
            days_in_trial: 30.0,
            visits_completed: 5.0,
            last_visit_day: None,
            adverse_events: 1.0,
        }
    }

    #[test]
    fn test_reference_record() {
        let record = to_backend_record(&sample()).expect("Should map");

        assert_eq!(record.patient_id, "P-1");
        assert_eq!(record.age, 45);
        assert_eq!(record.gender, Gender::Male);
        assert_eq!(record.trial_phase, TrialPhase::PhaseI);
        assert_eq!(record.treatment_group, TreatmentGroup::Control);
        assert_eq!(record.days_in_trial, 30);
        assert_eq!(record.visits_completed, 5);
        assert_eq!(record.last_visit_day, 25);
        assert_eq!(record.adverse_events, 1);

        let wire = serde_json::to_value(&record).unwrap();
        assert_eq!(wire["gender"], "Male");
        assert_eq!(wire["trial_phase"], "Phase I");
        assert_eq!(wire["treatment_group"], "Control");
        assert_eq!(wire["last_visit_day"], 25);
    }

    #[test]
    fn test_validate_number_clamps() {
        assert_eq!(validate_number(5.0, 18.0, 100.0).unwrap(), 18.0);
        assert_eq!(validate_number(250.0, 18.0, 100.0).unwrap(), 100.0);
        assert_eq!(validate_number(42.5, 18.0, 100.0).unwrap(), 42.5);
        assert_eq!(validate_number(-0.0, 0.0, 0.0).unwrap(), 0.0);

        for min in [-10.0, 0.0, 3.5] {
            for value in [-1e9, -1.0, 0.0, 2.0, 7.25, 1e12] {
                let max = min + 10.0;
                let v = validate_number(value, min, max).unwrap();
                assert!((min..=max).contains(&v));
            }
        }
    }

    #[test]
    fn test_validate_number_rejects_non_finite() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = validate_number(value, 0.0, 1.0).unwrap_err();
            assert!(matches!(err, TrialguardError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_enum_tables_and_defaults() {
        assert_eq!(map_gender("female"), Gender::Female);
        assert_eq!(map_gender("other"), Gender::NonBinary);
        assert_eq!(map_gender("Female"), Gender::Male); // exact match only
        assert_eq!(map_trial_phase("phase_4"), TrialPhase::PhaseIII);
        assert_eq!(map_trial_phase("phase_9"), TrialPhase::PhaseII);
        assert_eq!(map_treatment_group("treatment_b"), TreatmentGroup::Active);
        assert_eq!(map_treatment_group(""), TreatmentGroup::Control);
    }

    #[test]
    fn test_enum_mapping_is_total_and_deterministic() {
        let inputs = ["", "male", "MALE", "x", "phase_3", "placebo", "Phase I", "🙂"];
        for input in inputs {
            assert_eq!(map_gender(input), map_gender(input));
            assert_eq!(map_trial_phase(input), map_trial_phase(input));
            assert_eq!(map_treatment_group(input), map_treatment_group(input));
        }
    }

    #[test]
    fn test_fallbacks_are_reported() {
        let mut input = sample();
        input.gender = "unknown".to_string();
        input.treatment_group = "treatment_c".to_string();

        let mapped = map_patient(&input).unwrap();
        let fields: Vec<&str> = mapped.fallbacks.iter().map(|f| f.field).collect();
        assert_eq!(fields, vec!["gender", "treatment_group"]);
        assert_eq!(mapped.record.gender, Gender::Male);
        assert_eq!(mapped.record.treatment_group, TreatmentGroup::Control);

        assert!(map_patient(&sample()).unwrap().fallbacks.is_empty());
    }

    #[test]
    fn test_last_visit_day_defaults() {
        let mut input = sample();
        input.days_in_trial = 3.0;
        assert_eq!(to_backend_record(&input).unwrap().last_visit_day, 0);

        input.last_visit_day = Some(2.0);
        assert_eq!(to_backend_record(&input).unwrap().last_visit_day, 2);

        input.last_visit_day = Some(f64::NAN);
        assert!(to_backend_record(&input).is_err());
    }

    #[test]
    fn test_patient_id_sanitized_and_truncated() {
        let mut input = sample();
        input.patient_id = format!("  <b>{}</b>  ", "X".repeat(80));

        let record = to_backend_record(&input).unwrap();
        assert_eq!(record.patient_id.chars().count(), MAX_PATIENT_ID_CHARS);
        assert!(record.patient_id.starts_with("bXXX"));
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let mut input = sample();
        input.age = 7.0;
        input.days_in_trial = 0.0;
        input.visits_completed = 5000.0;
        input.adverse_events = -3.0;

        let record = to_backend_record(&input).unwrap();
        assert_eq!(record.age, 18);
        assert_eq!(record.days_in_trial, 1);
        assert_eq!(record.visits_completed, 1000);
        assert_eq!(record.adverse_events, 0);
        assert_eq!(record.last_visit_day, 0);
    }

    #[test]
    fn test_missing_number_is_invalid_input() {
        let mut input = sample();
        input.visits_completed = f64::NAN;
        let err = to_backend_record(&input).unwrap_err();
        assert_eq!(err.to_string(), "Invalid numeric value");
    }
}
