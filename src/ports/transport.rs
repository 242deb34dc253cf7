//! HTTP transport port: Trait for reaching the prediction backend.
//!
//! The application layer builds fully-formed requests (URL, headers, body)
//! and interprets responses; a transport only moves bytes. Status codes are
//! returned as data, never as errors.

use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    /// Value of the first header with the given name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response received from the backend, whatever its status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures where no response was received.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Other(String),
}

/// Trait for HTTP transports.
///
/// Implementations must enforce their own request timeout and report it as
/// [`TransportError::Timeout`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return the response, or the reason none arrived.
    ///
    /// # Errors
    /// Returns `TransportError` if no HTTP response was received.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Scripted in-memory transport for tests.
#[cfg(test)]
pub(crate) mod fake {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    /// One scripted reply.
    pub enum Reply {
        Json(u16, serde_json::Value),
        Fail(TransportError),
        /// Sleep on the tokio clock, then report a timeout.
        Hang(Duration),
    }

    /// Replies are consumed in order; once exhausted, `fallback` is used.
    pub struct ScriptedTransport {
        replies: Mutex<VecDeque<Reply>>,
        fallback: Option<(u16, serde_json::Value)>,
        pub requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                fallback: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Always answer with the same JSON body.
        pub fn always(status: u16, body: serde_json::Value) -> Self {
            Self {
                replies: Mutex::new(VecDeque::new()),
                fallback: Some((status, body)),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn last_request(&self) -> Option<HttpRequest> {
            self.requests.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request);

            let reply = self.replies.lock().unwrap().pop_front();
            let reply = match reply {
                Some(reply) => reply,
                None => match &self.fallback {
                    Some((status, body)) => Reply::Json(*status, body.clone()),
                    None => Reply::Fail(TransportError::Other("no scripted reply".to_string())),
                },
            };

            match reply {
                Reply::Json(status, body) => Ok(HttpResponse {
                    status,
                    body: body.to_string(),
                }),
                Reply::Fail(e) => Err(e),
                Reply::Hang(duration) => {
                    tokio::time::sleep(duration).await;
                    Err(TransportError::Timeout)
                }
            }
        }
    }
}
