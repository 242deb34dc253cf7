//! Background health polling.
//!
//! Checks the backend once on start, then on a fixed interval, and pushes
//! each status to the owner through a channel. Dropping the handle stops
//! the polling task.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::prediction::PredictionService;
use crate::domain::HealthStatus;
use crate::ports::HttpTransport;

/// One completed health check.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub checked_at: DateTime<Utc>,
}

/// Owner's side of a running health monitor.
pub struct HealthMonitorHandle {
    reports: Receiver<HealthReport>,
    refresh: Arc<Notify>,
    task: JoinHandle<()>,
}

impl HealthMonitorHandle {
    /// Latest report received since the last call (non-blocking).
    #[must_use]
    pub fn latest(&self) -> Option<HealthReport> {
        self.reports.try_iter().last()
    }

    /// Run a check now instead of waiting for the next tick.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }
}

impl Drop for HealthMonitorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Periodic health checker.
pub struct HealthMonitor;

impl HealthMonitor {
    /// Spawn the polling task on `runtime`.
    pub fn spawn<T>(
        runtime: &Handle,
        service: PredictionService<T>,
        interval: Duration,
    ) -> HealthMonitorHandle
    where
        T: HttpTransport + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let refresh = Arc::new(Notify::new());
        let wake = Arc::clone(&refresh);

        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    () = wake.notified() => ticker.reset(),
                }

                let status = service.health_check().await;
                let report = HealthReport {
                    status,
                    checked_at: Utc::now(),
                };
                if tx.send(report).is_err() {
                    // Owner is gone.
                    break;
                }
            }
        });

        HealthMonitorHandle {
            reports: rx,
            refresh,
            task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::client::ApiClient;
    use crate::config::ApiBase;
    use crate::ports::fake::ScriptedTransport;
    use serde_json::json;

    fn service() -> PredictionService<ScriptedTransport> {
        let client = ApiClient::new(
            ScriptedTransport::always(200, json!({"status": "healthy", "model_loaded": true})),
            ApiBase::Direct("http://backend.test".to_string()),
            "test-key",
            Duration::from_millis(500),
        );
        PredictionService::new(Arc::new(client))
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_immediately_then_on_interval() {
        let svc = service();
        let monitor = HealthMonitor::spawn(&Handle::current(), svc.clone(), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_millis(10)).await;
        let first = monitor.latest().expect("initial check");
        assert!(first.status.is_online());
        assert_eq!(svc.client().transport().request_count(), 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(monitor.latest().is_some());
        assert_eq!(svc.client().transport().request_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_and_teardown() {
        let svc = service();
        let monitor = HealthMonitor::spawn(&Handle::current(), svc.clone(), Duration::from_secs(30));
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Past the rate-limit window, then force a check.
        tokio::time::sleep(Duration::from_secs(1)).await;
        monitor.refresh();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(svc.client().transport().request_count(), 2);

        drop(monitor);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(svc.client().transport().request_count(), 2);
    }
}
