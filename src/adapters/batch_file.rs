//! Cohort file ingestion.
//!
//! Converts uploaded CSV or JSON content into [`PatientRecord`]s. Values are
//! not validated here; that happens when a record is mapped for the backend.

use std::path::Path;

use crate::domain::PatientRecord;
use crate::{Result, TrialguardError};

const UNSUPPORTED_FORMAT: &str = "Unsupported file format. Please upload CSV or JSON.";
const PARSE_FAILURE: &str = "Failed to parse file. Please check the format.";

/// Cohort file formats, chosen by file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchFormat {
    Csv,
    Json,
}

impl BatchFormat {
    /// # Errors
    /// Returns `UnsupportedFormat` for anything but `.csv` / `.json`.
    pub fn from_filename(filename: &str) -> Result<Self> {
        if filename.ends_with(".csv") {
            Ok(Self::Csv)
        } else if filename.ends_with(".json") {
            Ok(Self::Json)
        } else {
            Err(TrialguardError::UnsupportedFormat(UNSUPPORTED_FORMAT.to_string()))
        }
    }
}

/// Parse cohort file content.
///
/// # Errors
/// Returns `UnsupportedFormat` for unknown extensions and `ParseFailure` for
/// malformed content.
pub fn parse_batch_file(filename: &str, content: &str) -> Result<Vec<PatientRecord>> {
    match BatchFormat::from_filename(filename)? {
        BatchFormat::Csv => Ok(parse_csv(content)),
        BatchFormat::Json => parse_json(content),
    }
}

/// Read a cohort file from disk and parse it.
///
/// # Errors
/// Returns `Io` if the file cannot be read, otherwise as [`parse_batch_file`].
pub fn load_batch_file(path: &Path) -> Result<Vec<PatientRecord>> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    // Reject by name before touching the file.
    BatchFormat::from_filename(filename)?;

    let bytes = std::fs::read(path)?;
    let content = String::from_utf8(bytes)
        .map_err(|_| TrialguardError::ParseFailure(PARSE_FAILURE.to_string()))?;

    let records = parse_batch_file(filename, &content)?;
    tracing::info!(records = records.len(), "Loaded cohort file");
    Ok(records)
}

fn parse_csv(content: &str) -> Vec<PatientRecord> {
    let mut lines = content.split('\n');
    let headers: Vec<&str> = lines
        .next()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .collect();

    lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let values: Vec<&str> = line.split(',').collect();
            let mut record = PatientRecord::empty();

            for (index, header) in headers.iter().enumerate() {
                let value = values.get(index).map(|v| v.trim());
                match *header {
                    "patient_id" => record.patient_id = value.unwrap_or_default().to_string(),
                    "gender" => record.gender = value.unwrap_or_default().to_string(),
                    "trial_phase" => record.trial_phase = value.unwrap_or_default().to_string(),
                    "treatment_group" => {
                        record.treatment_group = value.unwrap_or_default().to_string()
                    }
                    "age" => record.age = coerce_number(value),
                    "days_in_trial" => record.days_in_trial = coerce_number(value),
                    "visits_completed" => record.visits_completed = coerce_number(value),
                    "adverse_events" => record.adverse_events = coerce_number(value),
                    "last_visit_day" => {
                        record.last_visit_day = match value {
                            Some("") | None => None,
                            other => Some(coerce_number(other)),
                        }
                    }
                    _ => {}
                }
            }

            record
        })
        .collect()
}

/// Missing or unreadable cells become NaN and are rejected downstream.
fn coerce_number(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn parse_json(content: &str) -> Result<Vec<PatientRecord>> {
    serde_json::from_str::<Vec<PatientRecord>>(content).map_err(|e| {
        tracing::debug!("Cohort JSON rejected: {}", e);
        TrialguardError::ParseFailure(PARSE_FAILURE.to_string())
    })
}
