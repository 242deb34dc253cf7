//! Runtime configuration from environment variables.

use std::time::Duration;

/// Path prefix a reverse proxy would serve the backend under.
pub const PROXY_PREFIX: &str = "/api/proxy";

pub const DEFAULT_BACKEND_ORIGIN: &str = "http://3.25.54.95";
pub const DEFAULT_API_KEY: &str = "dev-secret-key";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);
pub const DEFAULT_MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(30);

/// Where API requests go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiBase {
    /// Explicit base URL; paths are appended as-is.
    Direct(String),
    /// Requests are addressed to `/api/proxy/...` and rewritten onto the
    /// backend origin with the prefix stripped.
    Proxy { origin: String },
}

impl ApiBase {
    /// Absolute URL for an API path such as `/predict`.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        match self {
            Self::Direct(base) => join(base, path),
            Self::Proxy { origin } => {
                let proxied = join(PROXY_PREFIX, path);
                rewrite_proxy_path(origin, &proxied)
            }
        }
    }
}

/// Map a `/api/proxy/<rest>` path onto `<origin>/<rest>`. Paths outside the
/// prefix are joined to the origin unchanged.
#[must_use]
pub fn rewrite_proxy_path(origin: &str, path: &str) -> String {
    let rest = match path.strip_prefix(PROXY_PREFIX) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    };
    join(origin, rest)
}

fn join(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base, path.trim_start_matches('/'))
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: ApiBase,
    pub api_key: String,
    pub timeout: Duration,
    pub min_request_interval: Duration,
    pub health_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: ApiBase::Proxy {
                origin: DEFAULT_BACKEND_ORIGIN.to_string(),
            },
            api_key: DEFAULT_API_KEY.to_string(),
            timeout: DEFAULT_TIMEOUT,
            min_request_interval: DEFAULT_MIN_REQUEST_INTERVAL,
            health_interval: DEFAULT_HEALTH_INTERVAL,
        }
    }
}

impl AppConfig {
    /// Build configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base = match non_empty("TRIALGUARD_API_URL") {
            Some(url) => ApiBase::Direct(url),
            None => ApiBase::Proxy {
                origin: non_empty("TRIALGUARD_BACKEND_URL")
                    .unwrap_or_else(|| DEFAULT_BACKEND_ORIGIN.to_string()),
            },
        };

        let millis = |key: &str, default: Duration| match non_empty(key) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    tracing::warn!("Ignoring invalid {}={:?}, using default", key, raw);
                    default
                }
            },
            None => default,
        };

        let health_interval = match non_empty("TRIALGUARD_HEALTH_INTERVAL_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        "Ignoring invalid TRIALGUARD_HEALTH_INTERVAL_SECS={:?}, using default",
                        raw
                    );
                    DEFAULT_HEALTH_INTERVAL
                }
            },
            None => DEFAULT_HEALTH_INTERVAL,
        };

        Self {
            api_base,
            api_key: non_empty("TRIALGUARD_API_KEY").unwrap_or_else(|| DEFAULT_API_KEY.to_string()),
            timeout: millis("TRIALGUARD_TIMEOUT_MS", DEFAULT_TIMEOUT),
            min_request_interval: millis(
                "TRIALGUARD_MIN_REQUEST_INTERVAL_MS",
                DEFAULT_MIN_REQUEST_INTERVAL,
            ),
            health_interval,
        }
    }
}
