//! Local request throttle.
//!
//! A hard minimum spacing between outgoing requests. Rejected requests are
//! not queued or retried; the user resubmits.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use crate::{Result, TrialguardError};

const RATE_LIMITED: &str = "Please wait before making another request";

/// Proof that a request was admitted by a [`RateLimiter`].
///
/// A batch acquires one permit and dispatches all of its requests under it.
#[derive(Debug)]
pub(crate) struct Permit {
    _private: (),
}

/// Enforces a minimum interval between admitted requests.
///
/// Each client owns its own limiter, so independent clients never share
/// timing state.
#[derive(Debug)]
pub(crate) struct RateLimiter {
    min_interval: Duration,
    last_admitted: Mutex<Option<Instant>>,
}

impl RateLimiter {
    #[must_use]
    pub(crate) fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_admitted: Mutex::new(None),
        }
    }

    /// Admit a request now, or reject it.
    ///
    /// # Errors
    /// Returns `RateLimited` if the previous admission was less than the
    /// minimum interval ago. The stored timestamp is left untouched.
    pub(crate) fn try_acquire(&self) -> Result<Permit> {
        self.try_acquire_at(Instant::now())
    }

    fn try_acquire_at(&self, now: Instant) -> Result<Permit> {
        let mut last = self
            .last_admitted
            .lock()
            .map_err(|_| TrialguardError::RateLimited(RATE_LIMITED.to_string()))?;

        if let Some(previous) = *last {
            if now.saturating_duration_since(previous) < self.min_interval {
                tracing::debug!("Request rejected by local rate limiter");
                return Err(TrialguardError::RateLimited(RATE_LIMITED.to_string()));
            }
        }

        *last = Some(now);
        Ok(Permit { _private: () })
    }

    /// When the last request was admitted, if any.
    #[cfg(test)]
    fn last_admitted(&self) -> Option<Instant> {
        self.last_admitted.lock().ok().and_then(|guard| *guard)
    }
}
