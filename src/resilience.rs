//! Retry, cache consultation, and fallback-to-substitute escalation.
//!
//! The controller is the only component allowed to recover from failures
//! automatically. Backoff is linear, not exponential: in a UI context a
//! user is waiting synchronously, so worst-case added latency must stay
//! bounded and predictable. The single post-fallback attempt (instead of
//! restarting the retry budget) bounds total attempts to `retry_count + 2`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::api::error::codes;
use crate::api::ApiError;
use crate::cache::ResponseCache;
use crate::mode::ClientMode;

/// Default number of retries after the initial attempt.
const DEFAULT_RETRY_COUNT: u32 = 2;

/// Default base delay between attempts.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Default cache TTL (5 minutes).
const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(300_000);

/// Per-call resilience settings. A plain value, never persisted.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub fallback_to_substitute: bool,
    pub cache_key: Option<String>,
    pub cache_ttl: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_count: DEFAULT_RETRY_COUNT,
            retry_delay: DEFAULT_RETRY_DELAY,
            fallback_to_substitute: true,
            cache_key: None,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl RetryPolicy {
    pub fn cached(key: impl Into<String>) -> Self {
        Self {
            cache_key: Some(key.into()),
            ..Default::default()
        }
    }

    pub fn with_retries(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn no_fallback(mut self) -> Self {
        self.fallback_to_substitute = false;
        self
    }
}

/// Wraps units of work with retry, caching, and degrade-to-substitute.
pub struct ResilienceController {
    cache: Arc<ResponseCache>,
    mode: Arc<ClientMode>,
}

impl ResilienceController {
    pub fn new(cache: Arc<ResponseCache>, mode: Arc<ClientMode>) -> Self {
        Self { cache, mode }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Run `call` under `policy`.
    ///
    /// Order of business: cache fast path, then up to `retry_count + 1`
    /// attempts with linear backoff. If the final attempt fails while the
    /// facade still reports real-API mode and fallback is enabled, the
    /// mode is flipped to substitute and `call` is invoked exactly once
    /// more - the facade now routes it to the substitute backend. If that
    /// attempt fails too, the error surfaced is the *first* attempt's,
    /// so the diagnostic of record describes the primary backend.
    pub async fn execute<T, F, Fut>(&self, policy: &RetryPolicy, call: F) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if let Some(ref key) = policy.cache_key {
            if let Some(hit) = self.cache.get::<T>(key) {
                debug!(key = key.as_str(), "serving from response cache");
                return Ok(hit);
            }
        }

        let mut first_error: Option<ApiError> = None;
        let mut last_error: Option<ApiError> = None;

        for attempt in 0..=policy.retry_count {
            match call().await {
                Ok(result) => {
                    if let Some(ref key) = policy.cache_key {
                        self.cache.set(key, &result, policy.cache_ttl);
                    }
                    return Ok(result);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "request attempt failed");
                    if first_error.is_none() {
                        first_error = Some(e.clone());
                    }
                    last_error = Some(e);
                }
            }

            let is_last_attempt = attempt == policy.retry_count;
            if is_last_attempt {
                if policy.fallback_to_substitute && self.mode.is_using_real_api() {
                    warn!("all attempts failed, degrading to substitute backend");
                    self.mode.degrade_to_substitute();
                    match call().await {
                        Ok(result) => return Ok(result),
                        Err(substitute_err) => {
                            debug!(error = %substitute_err, "substitute attempt also failed");
                            return Err(first_error.unwrap_or(substitute_err));
                        }
                    }
                }
            } else {
                // Linear backoff: delay grows with the attempt number.
                tokio::time::sleep(policy.retry_delay * (attempt + 1)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ApiError::new("request failed", codes::REQUEST_FAILED, 0)
        }))
    }
}
