//! API client: the boundary between the pipeline and the wire.
//!
//! Every request:
//! 1. passes the rate limiter (or presents a permit acquired by the caller)
//! 2. has its body sanitized
//! 3. carries the `x-api-key` and JSON content-type headers
//!
//! Every failure leaves this module as a [`TrialguardError`] whose message
//! can be shown to the user as-is.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::rate_limit::{Permit, RateLimiter};
use crate::adapters::sanitize::sanitize_value;
use crate::config::{ApiBase, AppConfig};
use crate::ports::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::{Result, TrialguardError};

pub const API_KEY_HEADER: &str = "x-api-key";

pub const PREDICT_PATH: &str = "/predict";
pub const HEALTH_PATH: &str = "/health";

/// Client for the prediction backend.
pub struct ApiClient<T: HttpTransport> {
    transport: T,
    base: ApiBase,
    api_key: String,
    limiter: RateLimiter,
}

impl<T: HttpTransport> ApiClient<T> {
    /// Create a client over `transport`.
    pub fn new(transport: T, base: ApiBase, api_key: impl Into<String>, min_interval: Duration) -> Self {
        Self {
            transport,
            base,
            api_key: api_key.into(),
            limiter: RateLimiter::new(min_interval),
        }
    }

    /// Create a client from application configuration.
    pub fn from_config(transport: T, config: &AppConfig) -> Self {
        Self::new(
            transport,
            config.api_base.clone(),
            config.api_key.clone(),
            config.min_request_interval,
        )
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn base(&self) -> &ApiBase {
        &self.base
    }

    /// Acquire a permit for requests the caller will dispatch together.
    ///
    /// Only batch prediction holds a permit across several requests; the
    /// permit never leaves the crate.
    ///
    /// # Errors
    /// Returns `RateLimited` if the previous request was too recent.
    pub(crate) fn acquire(&self) -> Result<Permit> {
        self.limiter.try_acquire()
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    /// Returns a normalized error (see [`normalize_status`]).
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let permit = self.acquire()?;
        self.send(&permit, HttpMethod::Get, path, None).await
    }

    /// `POST` a JSON body.
    ///
    /// # Errors
    /// Returns a normalized error (see [`normalize_status`]).
    pub async fn post_json<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let permit = self.acquire()?;
        self.post_json_with(&permit, path, body).await
    }

    /// `POST` under a permit acquired earlier with [`ApiClient::acquire`].
    ///
    /// # Errors
    /// Returns a normalized error (see [`normalize_status`]).
    pub(crate) async fn post_json_with<B: Serialize, R: DeserializeOwned>(
        &self,
        permit: &Permit,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let body = serde_json::to_value(body)?;
        self.send(permit, HttpMethod::Post, path, Some(body)).await
    }

    async fn send<R: DeserializeOwned>(
        &self,
        _permit: &Permit,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<R> {
        let request = HttpRequest {
            method,
            url: self.base.url_for(path),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                (API_KEY_HEADER.to_string(), self.api_key.clone()),
            ],
            body: body.map(sanitize_value),
        };

        tracing::debug!(method = ?method, path, "Sending API request");

        let response = self
            .transport
            .send(request)
            .await
            .map_err(normalize_transport)?;

        if !response.is_success() {
            tracing::debug!(status = response.status, path, "API request failed");
            return Err(normalize_status(&response));
        }

        Ok(serde_json::from_str(&response.body)?)
    }
}

/// Map a non-2xx response to a user-facing error.
///
/// Statuses without a rule keep their own status and generic message.
#[must_use]
pub fn normalize_status(response: &HttpResponse) -> TrialguardError {
    match response.status {
        429 => TrialguardError::RateLimited("Too many requests. Please try again later.".to_string()),
        400 => TrialguardError::InvalidInput("Invalid input data. Please check your entries.".to_string()),
        401 => TrialguardError::AuthFailed(
            "Authentication failed. Please check API credentials.".to_string(),
        ),
        status if status >= 500 => TrialguardError::ServiceUnavailable(
            "Service temporarily unavailable. Please try again.".to_string(),
        ),
        status => TrialguardError::Http {
            status,
            message: format!("Request failed with status code {status}"),
        },
    }
}

/// Map a failure where no response arrived.
#[must_use]
pub fn normalize_transport(error: TransportError) -> TrialguardError {
    tracing::debug!("Transport failure: {}", error);
    match error {
        TransportError::Timeout => TrialguardError::Timeout("Request timeout. Please try again.".to_string()),
        TransportError::Connect(_) | TransportError::Other(_) => TrialguardError::Unreachable(
            "Unable to connect to the service. Please check your connection.".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::fake::{Reply, ScriptedTransport};
    use serde_json::{json, Value};

    fn client(replies: Vec<Reply>) -> ApiClient<ScriptedTransport> {
        ApiClient::new(
            ScriptedTransport::new(replies),
            ApiBase::Direct("http://backend.test".to_string()),
            "test-key",
            Duration::from_millis(500),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_headers_url_and_sanitized_body() {
        let client = client(vec![Reply::Json(200, json!({"ok": true}))]);

        let body = json!({"patient_id": " <P-1> ", "note": "javascript:alert(1)"});
        let reply: Value = client.post_json(PREDICT_PATH, &body).await.unwrap();
        assert_eq!(reply, json!({"ok": true}));

        let sent = client.transport().last_request().unwrap();
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.url, "http://backend.test/predict");
        assert_eq!(sent.header("x-api-key"), Some("test-key"));
        assert_eq!(sent.header("content-type"), Some("application/json"));
        assert_eq!(sent.body, Some(json!({"patient_id": "P-1", "note": "alert(1)"})));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_normalization() {
        let cases = [
            (429, "Too many requests. Please try again later."),
            (400, "Invalid input data. Please check your entries."),
            (401, "Authentication failed. Please check API credentials."),
            (500, "Service temporarily unavailable. Please try again."),
            (503, "Service temporarily unavailable. Please try again."),
            (404, "Request failed with status code 404"),
        ];

        for (status, message) in cases {
            let client = client(vec![Reply::Json(status, json!({"detail": "raw backend text"}))]);
            let err = client.get_json::<Value>(HEALTH_PATH).await.unwrap_err();
            assert_eq!(err.to_string(), message, "status {status}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_variants() {
        let response = |status| HttpResponse {
            status,
            body: String::new(),
        };
        assert!(matches!(normalize_status(&response(429)), TrialguardError::RateLimited(_)));
        assert!(matches!(normalize_status(&response(400)), TrialguardError::InvalidInput(_)));
        assert!(matches!(normalize_status(&response(401)), TrialguardError::AuthFailed(_)));
        assert!(matches!(
            normalize_status(&response(502)),
            TrialguardError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            normalize_status(&response(403)),
            TrialguardError::Http { status: 403, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failures() {
        let client = client(vec![Reply::Fail(TransportError::Connect("refused".to_string()))]);
        let err = client.get_json::<Value>(HEALTH_PATH).await.unwrap_err();
        assert!(matches!(err, TrialguardError::Unreachable(_)));

        let client = self::client(vec![Reply::Hang(Duration::from_secs(30))]);
        let err = client.get_json::<Value>(HEALTH_PATH).await.unwrap_err();
        assert!(matches!(err, TrialguardError::Timeout(_)));
        assert_eq!(err.to_string(), "Request timeout. Please try again.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_request_is_not_sent() {
        let client = client(vec![
            Reply::Json(200, json!({})),
            Reply::Json(200, json!({})),
        ]);

        client.get_json::<Value>(HEALTH_PATH).await.unwrap();
        let err = client.get_json::<Value>(HEALTH_PATH).await.unwrap_err();
        assert!(matches!(err, TrialguardError::RateLimited(_)));
        assert_eq!(client.transport().request_count(), 1);

        tokio::time::advance(Duration::from_millis(500)).await;
        client.get_json::<Value>(HEALTH_PATH).await.unwrap();
        assert_eq!(client.transport().request_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permit_covers_multiple_requests() {
        let client = client(vec![
            Reply::Json(200, json!(1)),
            Reply::Json(200, json!(2)),
        ]);

        let permit = client.acquire().unwrap();
        let a: Value = client.post_json_with(&permit, PREDICT_PATH, &json!({})).await.unwrap();
        let b: Value = client.post_json_with(&permit, PREDICT_PATH, &json!({})).await.unwrap();
        assert_eq!((a, b), (json!(1), json!(2)));
    }
}
