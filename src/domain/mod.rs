//! Domain layer: Core business types.
//!
//! Plain data types shared by the pipeline and the UI. All types are
//! serializable; none of them perform I/O.

mod health;
pub mod model_info;
mod patient;
mod prediction;

pub use health::HealthStatus;
pub use model_info::{ModelInfo, PlatformStats, PLATFORM_STATS, PRODUCTION_MODEL_INFO};
pub use patient::{
    BackendPatientRecord, FieldFallback, Gender, PatientRecord, TreatmentGroup, TrialPhase,
};
pub use prediction::{BatchOutcome, BatchSummary, PredictionResult, RiskLevel};
