//! Fixed-interval rate limiting in front of the model.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

use super::executor::ModelExecutor;
use crate::error::ModelError;

pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 10;

/// Enforces a minimum gap between calls.
///
/// Holds at most one pending slot: a caller arriving early sleeps for the rest
/// of the interval. The lock is held across the sleep, so concurrent callers
/// go through one at a time.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Zero is treated as one request per minute.
    pub fn per_minute(requests_per_minute: u32) -> Self {
        let rpm = requests_per_minute.max(1);
        Self::with_interval(Duration::from_secs(60) / rpm)
    }

    pub fn with_interval(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until the interval since the previous call has elapsed, then
    /// record this call.
    pub async fn wait(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let remaining = self.min_interval - elapsed;
                debug!(wait_ms = remaining.as_millis() as u64, "Rate limiting model call");
                sleep(remaining).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_minute(DEFAULT_REQUESTS_PER_MINUTE)
    }
}

/// Wraps an executor so every call first passes the rate limiter.
pub struct RateLimitedExecutor<E> {
    inner: E,
    limiter: RateLimiter,
}

impl<E: ModelExecutor> RateLimitedExecutor<E> {
    pub fn new(inner: E, limiter: RateLimiter) -> Self {
        Self { inner, limiter }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

#[async_trait]
impl<E: ModelExecutor> ModelExecutor for RateLimitedExecutor<E> {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.limiter.wait().await;
        self.inner.complete(prompt).await
    }
}
