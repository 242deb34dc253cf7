//! Background prediction worker.
//!
//! Requests run as tasks on the tokio runtime so the TUI loop keeps
//! drawing while the backend answers. Results come back over a channel
//! that the loop polls without blocking.

use std::sync::mpsc::{self, Receiver};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::application::PredictionService;
use crate::domain::{BatchOutcome, PatientRecord, PredictionResult};
use crate::ports::HttpTransport;

/// Messages from a running job.
#[derive(Debug)]
pub enum WorkerEvent {
    /// Request dispatched to the backend
    Started { records: usize },
    /// Single prediction finished
    Single(crate::Result<PredictionResult>),
    /// Batch finished (or was rejected as a whole)
    Batch(crate::Result<BatchOutcome>),
}

/// Handle to a running job.
pub struct PredictionWorkerHandle {
    events: Receiver<WorkerEvent>,
    _task: JoinHandle<()>,
}

impl PredictionWorkerHandle {
    /// Try to receive the next event (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<WorkerEvent> {
        self.events.try_recv().ok()
    }
}

/// Spawns prediction jobs onto the runtime.
pub struct PredictionWorker;

impl PredictionWorker {
    /// Run `predict_one` in the background.
    pub fn spawn_single<T>(
        runtime: &Handle,
        service: PredictionService<T>,
        record: PatientRecord,
    ) -> PredictionWorkerHandle
    where
        T: HttpTransport + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let task = runtime.spawn(async move {
            let _ = tx.send(WorkerEvent::Started { records: 1 });
            let result = service.predict_one(&record).await;
            let _ = tx.send(WorkerEvent::Single(result));
        });

        PredictionWorkerHandle {
            events: rx,
            _task: task,
        }
    }

    /// Run `predict_batch` in the background.
    pub fn spawn_batch<T>(
        runtime: &Handle,
        service: PredictionService<T>,
        records: Vec<PatientRecord>,
    ) -> PredictionWorkerHandle
    where
        T: HttpTransport + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let task = runtime.spawn(async move {
            let _ = tx.send(WorkerEvent::Started {
                records: records.len(),
            });
            let outcome = service.predict_batch(&records).await;
            let _ = tx.send(WorkerEvent::Batch(outcome));
        });

        PredictionWorkerHandle {
            events: rx,
            _task: task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApiClient;
    use crate::config::ApiBase;
    use crate::ports::fake::ScriptedTransport;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn service() -> PredictionService<ScriptedTransport> {
        let transport = ScriptedTransport::always(
            200,
            json!({
                "patient_id": "P-1",
                "dropout_prediction": 1,
                "dropout_probability": 0.91,
                "risk_level": "Critical",
                "recommended_action": "Immediate outreach",
                "intervention_cost": 500
            }),
        );
        let client = ApiClient::new(
            transport,
            ApiBase::Direct("http://backend.test".to_string()),
            "test-key",
            Duration::from_millis(500),
        );
        PredictionService::new(Arc::new(client))
    }

    fn record() -> PatientRecord {
        PatientRecord {
            patient_id: "P-1".to_string(),
            age: 70.0,
            gender: "female".to_string(),
            trial_phase: "phase_3".to_string(),
            treatment_group: "active".to_string(),
            days_in_trial: 120.0,
            visits_completed: 2.0,
            last_visit_day: Some(40.0),
            adverse_events: 4.0,
        }
    }

    async fn drain(handle: &PredictionWorkerHandle) -> Vec<WorkerEvent> {
        let mut events = Vec::new();
        for _ in 0..100 {
            while let Some(event) = handle.try_recv() {
                events.push(event);
            }
            if events.len() >= 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        events
    }

    #[tokio::test]
    async fn test_single_job_reports_start_then_result() {
        let handle = PredictionWorker::spawn_single(&Handle::current(), service(), record());
        let events = drain(&handle).await;

        assert!(matches!(events[0], WorkerEvent::Started { records: 1 }));
        match &events[1] {
            WorkerEvent::Single(Ok(prediction)) => {
                assert_eq!(prediction.patient_id, "P-1");
                assert_eq!(prediction.intervention_cost, 500.0);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_batch_job_reports_outcome() {
        let records = vec![record(), record()];
        let handle = PredictionWorker::spawn_batch(&Handle::current(), service(), records);
        let events = drain(&handle).await;

        assert!(matches!(events[0], WorkerEvent::Started { records: 2 }));
        match &events[1] {
            WorkerEvent::Batch(Ok(outcome)) => assert_eq!(outcome.summary().critical, 2),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
