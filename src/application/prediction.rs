//! Prediction service: Orchestrates dropout-risk requests.
//!
//! This service coordinates:
//! - Record validation and mapping
//! - Single and batch dispatch through the API client
//! - Static model enrichment of results
//! - Health checks

use std::sync::Arc;

use futures::future::join_all;
use tokio::time::Instant;

use super::client::{ApiClient, HEALTH_PATH, PREDICT_PATH};
use super::mapper::map_patient;
use super::rate_limit::Permit;
use crate::domain::{
    BatchOutcome, FieldFallback, HealthStatus, ModelInfo, PatientRecord, PredictionResult,
    PRODUCTION_MODEL_INFO,
};
use crate::ports::HttpTransport;
use crate::{Result, TrialguardError};

/// Largest cohort accepted by [`PredictionService::predict_batch`].
pub const MAX_BATCH_SIZE: usize = 100;

const SERVICE_UNAVAILABLE: &str = "Service unavailable. Please check backend connection.";

/// Service for running dropout-risk predictions against the backend.
pub struct PredictionService<T: HttpTransport> {
    client: Arc<ApiClient<T>>,
    model: &'static ModelInfo,
}

impl<T: HttpTransport> Clone for PredictionService<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            model: self.model,
        }
    }
}

impl<T: HttpTransport> PredictionService<T> {
    /// Create a new prediction service using the production model metadata.
    pub fn new(client: Arc<ApiClient<T>>) -> Self {
        Self {
            client,
            model: &PRODUCTION_MODEL_INFO,
        }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    #[must_use]
    pub fn model_info(&self) -> &'static ModelInfo {
        self.model
    }

    /// Predict dropout risk for one patient.
    ///
    /// # Errors
    /// Returns `InvalidInput` if a numeric field is not a number. Every
    /// failure after that is logged and reported as `ServiceUnavailable`.
    pub async fn predict_one(&self, record: &PatientRecord) -> Result<PredictionResult> {
        let mapped = map_patient(record)?;
        let response = self.client.post_json(PREDICT_PATH, &mapped.record).await;
        self.finish(response, mapped.fallbacks)
    }

    async fn predict_admitted(&self, permit: &Permit, record: &PatientRecord) -> Result<PredictionResult> {
        let mapped = map_patient(record)?;
        let response = self
            .client
            .post_json_with(permit, PREDICT_PATH, &mapped.record)
            .await;
        self.finish(response, mapped.fallbacks)
    }

    fn finish(
        &self,
        response: Result<PredictionResult>,
        fallbacks: Vec<FieldFallback>,
    ) -> Result<PredictionResult> {
        match response {
            Ok(prediction) => {
                let prediction = prediction.enrich(self.model).with_fallbacks(fallbacks);
                tracing::info!(
                    patient_id = %prediction.patient_id,
                    risk = %prediction.risk_level,
                    "Prediction complete: probability={:.2}",
                    prediction.dropout_probability
                );
                Ok(prediction)
            }
            Err(e) => {
                tracing::error!("Prediction request failed: {}", e);
                Err(TrialguardError::ServiceUnavailable(SERVICE_UNAVAILABLE.to_string()))
            }
        }
    }

    /// Predict dropout risk for a cohort.
    ///
    /// The batch is admitted by the rate limiter once; its records are then
    /// dispatched concurrently. The outcome holds one result per record, in
    /// input order, so one failure does not discard the others.
    ///
    /// # Errors
    /// Returns `BatchTooLarge` (before any request) for more than
    /// [`MAX_BATCH_SIZE`] records, or `RateLimited` if the batch itself is
    /// not admitted.
    pub async fn predict_batch(&self, records: &[PatientRecord]) -> Result<BatchOutcome> {
        if records.len() > MAX_BATCH_SIZE {
            return Err(TrialguardError::BatchTooLarge {
                size: records.len(),
                max: MAX_BATCH_SIZE,
            });
        }
        if records.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let permit = self.client.acquire()?;
        tracing::info!(records = records.len(), "Dispatching batch prediction");

        let results = join_all(
            records
                .iter()
                .map(|record| self.predict_admitted(&permit, record)),
        )
        .await;

        let outcome = BatchOutcome { results };
        let summary = outcome.summary();
        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Batch prediction complete"
        );
        Ok(outcome)
    }

    /// Query backend health. Never fails: any error yields an offline status.
    pub async fn health_check(&self) -> HealthStatus {
        let started = Instant::now();
        let response = self.client.get_json::<HealthStatus>(HEALTH_PATH).await;
        let latency = elapsed_ms(started);

        match response {
            Ok(mut status) => {
                status.latency = Some(latency);
                tracing::debug!(latency_ms = latency, status = %status.status, "Health check complete");
                status
            }
            Err(e) => {
                tracing::debug!(latency_ms = latency, "Health check failed: {}", e);
                HealthStatus::offline(latency)
            }
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiBase;
    use crate::domain::RiskLevel;
    use crate::ports::fake::{Reply, ScriptedTransport};
    use crate::ports::TransportError;
    use serde_json::json;
    use std::time::Duration;

    fn service(transport: ScriptedTransport) -> PredictionService<ScriptedTransport> {
        let client = ApiClient::new(
            transport,
            ApiBase::Direct("http://backend.test".to_string()),
            "test-key",
            Duration::from_millis(500),
        );
        PredictionService::new(Arc::new(client))
    }

    fn record(id: &str) -> PatientRecord {
        PatientRecord {
            patient_id: id.to_string(),
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

    fn backend_prediction(id: &str, risk: &str) -> serde_json::Value {
        json!({
            "patient_id": id,
            "dropout_prediction": 0,
            "dropout_probability": 0.12,
            "risk_level": risk,
            "recommended_action": "Continue standard monitoring",
            "intervention_cost": 0
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_predict_one_enriches_and_sends_mapped_record() {
        let svc = service(ScriptedTransport::new(vec![Reply::Json(
            200,
            backend_prediction("P-1", "Low"),
        )]));

        let result = svc.predict_one(&record("P-1")).await.unwrap();
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.model_used.as_deref(), Some("Logistic Regression (Production)"));
        assert_eq!(result.confidence, Some(0.58));

        let sent = svc.client().transport().last_request().unwrap();
        let body = sent.body.unwrap();
        assert_eq!(body["gender"], "Male");
        assert_eq!(body["trial_phase"], "Phase I");
        assert_eq!(body["treatment_group"], "Control");
        assert_eq!(body["last_visit_day"], 25);
    }

    #[tokio::test(start_paused = true)]
    async fn test_predict_one_reports_defaulted_fields() {
        let svc = service(ScriptedTransport::always(200, backend_prediction("P-1", "Low")));
        let mut odd = record("P-1");
        odd.gender = "unknown".to_string();
        odd.treatment_group = "Control".to_string();

        let result = svc.predict_one(&odd).await.unwrap();
        let fields: Vec<&str> = result.fallbacks.iter().map(|f| f.field).collect();
        assert_eq!(fields, ["gender", "treatment_group"]);
        assert_eq!(result.fallbacks[0].value, "unknown");
        assert_eq!(result.fallbacks[0].substituted, "Male");

        // A clean record carries no fallbacks.
        tokio::time::advance(Duration::from_millis(500)).await;
        let clean = svc.predict_one(&record("P-2")).await.unwrap();
        assert!(clean.fallbacks.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_counts_defaulted_records() {
        let svc = service(ScriptedTransport::always(200, backend_prediction("P", "Low")));
        let mut records: Vec<PatientRecord> = (0..3).map(|i| record(&format!("P-{i}"))).collect();
        records[1].trial_phase = "phase_9".to_string();

        let outcome = svc.predict_batch(&records).await.unwrap();
        assert_eq!(outcome.summary().defaulted, 1);
        assert_eq!(outcome.results[1].as_ref().unwrap().fallbacks[0].field, "trial_phase");
    }

    #[tokio::test(start_paused = true)]
    async fn test_predict_one_hides_transport_cause() {
        for reply in [
            Reply::Json(500, json!({"detail": "stack trace"})),
            Reply::Json(200, json!({"unexpected": "shape"})),
            Reply::Fail(TransportError::Connect("refused".to_string())),
        ] {
            let svc = service(ScriptedTransport::new(vec![reply]));
            let err = svc.predict_one(&record("P-1")).await.unwrap_err();
            assert!(matches!(err, TrialguardError::ServiceUnavailable(_)));
            assert_eq!(err.to_string(), SERVICE_UNAVAILABLE);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_predict_one_invalid_number_is_not_sent() {
        let svc = service(ScriptedTransport::always(200, backend_prediction("P-1", "Low")));
        let mut bad = record("P-1");
        bad.age = f64::NAN;

        let err = svc.predict_one(&bad).await.unwrap_err();
        assert!(matches!(err, TrialguardError::InvalidInput(_)));
        assert_eq!(svc.client().transport().request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_too_large_sends_nothing() {
        let svc = service(ScriptedTransport::always(200, backend_prediction("P", "Low")));
        let records: Vec<PatientRecord> = (0..101).map(|i| record(&format!("P-{i}"))).collect();

        let err = svc.predict_batch(&records).await.unwrap_err();
        assert!(matches!(err, TrialguardError::BatchTooLarge { size: 101, max: 100 }));
        assert_eq!(err.to_string(), "Batch size exceeds maximum of 100 patients");
        assert_eq!(svc.client().transport().request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_preserves_order_and_reports_partial_failure() {
        let svc = service(ScriptedTransport::new(vec![
            Reply::Json(200, backend_prediction("P-0", "Low")),
            Reply::Json(503, json!({})),
            Reply::Json(200, backend_prediction("P-2", "Critical")),
        ]));
        let records: Vec<PatientRecord> = (0..3).map(|i| record(&format!("P-{i}"))).collect();

        let outcome = svc.predict_batch(&records).await.unwrap();
        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.results[0].as_ref().unwrap().patient_id, "P-0");
        assert!(matches!(
            outcome.results[1],
            Err(TrialguardError::ServiceUnavailable(_))
        ));
        assert_eq!(outcome.results[2].as_ref().unwrap().risk_level, RiskLevel::Critical);

        let summary = outcome.summary();
        assert_eq!((summary.succeeded, summary.failed), (2, 1));
        assert_eq!(svc.client().transport().request_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_full_size_is_admitted_once() {
        let svc = service(ScriptedTransport::always(200, backend_prediction("P", "Medium")));
        let records: Vec<PatientRecord> = (0..100).map(|i| record(&format!("P-{i}"))).collect();

        let outcome = svc.predict_batch(&records).await.unwrap();
        assert_eq!(outcome.summary().medium, 100);

        // The batch consumed the rate-limit window.
        let err = svc.predict_batch(&records[..1]).await.unwrap_err();
        assert!(matches!(err, TrialguardError::RateLimited(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_permit_ends_with_the_batch() {
        let svc = service(ScriptedTransport::always(200, backend_prediction("P", "Low")));
        let records: Vec<PatientRecord> = (0..3).map(|i| record(&format!("P-{i}"))).collect();
        svc.predict_batch(&records).await.unwrap();
        assert_eq!(svc.client().transport().request_count(), 3);

        // Follow-up requests go back through the limiter.
        let err = svc.predict_one(&record("P-9")).await.unwrap_err();
        assert!(matches!(err, TrialguardError::RateLimited(_)));
        assert_eq!(svc.client().transport().request_count(), 3);

        tokio::time::advance(Duration::from_millis(500)).await;
        svc.predict_one(&record("P-9")).await.unwrap();
        assert_eq!(svc.client().transport().request_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_batch() {
        let svc = service(ScriptedTransport::always(200, json!({})));
        let outcome = svc.predict_batch(&[]).await.unwrap();
        assert!(outcome.results.is_empty());
        assert_eq!(svc.client().transport().request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_check_online() {
        let svc = service(ScriptedTransport::new(vec![Reply::Json(
            200,
            json!({"status": "healthy", "model_loaded": true, "model_path": "/models/lr.pkl", "version": "2.0.0"}),
        )]));

        let status = svc.health_check().await;
        assert!(status.is_online());
        assert!(status.model_loaded);
        assert_eq!(status.model_path.as_deref(), Some("/models/lr.pkl"));
        assert!(status.latency.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_check_timeout_reports_offline() {
        let svc = service(ScriptedTransport::new(vec![Reply::Hang(Duration::from_millis(30_000))]));

        let status = svc.health_check().await;
        assert_eq!(status.status, "offline");
        assert!(!status.model_loaded);
        assert!(status.latency.unwrap() >= 30_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_check_rate_limited_reports_offline() {
        let svc = service(ScriptedTransport::always(
            200,
            json!({"status": "online", "model_loaded": true}),
        ));

        assert!(svc.health_check().await.is_online());
        let second = svc.health_check().await;
        assert!(!second.is_online());
        assert_eq!(svc.client().transport().request_count(), 1);
    }
}
