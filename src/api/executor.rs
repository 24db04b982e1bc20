//! Rate-limit-aware execution of single HTTP requests.
//!
//! DocBase enforces per-minute quotas and answers over-limit requests with
//! HTTP 429 plus an `x-ratelimit-reset` header (Unix epoch seconds). The
//! executor retries such requests after sleeping until the declared reset
//! time; every other failure is drained into a diagnostic error and returned
//! to the caller. The sleep is cooperative, so fanned-out sibling tasks keep
//! making progress while one task waits out a quota window.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};

use crate::error::{MigrationError, Result};

/// Response header carrying the quota reset time in Unix epoch seconds.
pub const RATELIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Time source and sleep used by the executor.
///
/// Injectable so tests can simulate rate-limit waits without real delays.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current wall-clock time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;

    /// Suspend the calling task for the given duration.
    async fn sleep(&self, duration: Duration);
}

/// Production clock: chrono wall time + tokio sleep.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Milliseconds to wait before retrying a rate-limited request.
///
/// Non-positive means the quota has already reset and the retry may proceed
/// immediately.
#[must_use]
pub fn retry_wait_ms(reset_epoch_secs: i64, now_ms: i64) -> i64 {
    reset_epoch_secs * 1000 - now_ms
}

/// Executes single HTTP requests, absorbing 429 responses by waiting for the
/// server-declared quota reset and retrying.
///
/// There is no retry cap: the loop is driven entirely by the rate-limit
/// headers, and the executor will wait arbitrarily long rather than give up.
pub struct RateLimitExecutor {
    clock: Arc<dyn Clock>,
}

impl RateLimitExecutor {
    /// Create an executor backed by the system clock.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
        }
    }

    /// Create an executor with an injected clock (for tests).
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Run `request` until it yields a successful response.
    ///
    /// `request` must build a fresh request on every call; it is re-invoked
    /// after each rate-limit wait.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Transport`] on network failure and
    /// [`MigrationError::Api`] for any non-success, non-429 status. 429
    /// never surfaces.
    pub async fn run<F, Fut>(&self, mut request: F) -> Result<Response>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<Response, reqwest::Error>>,
    {
        loop {
            let response = request().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let reset_secs = response
                    .headers()
                    .get(RATELIMIT_RESET_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<i64>().ok());
                // A 429 without a usable reset header retries immediately,
                // same as a reset that already passed.
                let wait = reset_secs
                    .map(|secs| retry_wait_ms(secs, self.clock.now_ms()))
                    .unwrap_or(0);
                if wait > 0 {
                    tracing::info!(wait_ms = wait, "rate limited, waiting for quota reset");
                    self.clock.sleep(Duration::from_millis(wait as u64)).await;
                }
                continue;
            }

            return Err(api_error(response).await);
        }
    }
}

impl Default for RateLimitExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain a failed response into a diagnostic error value.
async fn api_error(response: Response) -> MigrationError {
    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| format!("{name}: {}", value.to_str().unwrap_or("<binary>")))
        .collect::<Vec<_>>()
        .join("\n");
    let body = response.text().await.unwrap_or_default();
    MigrationError::Api {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("unknown").to_owned(),
        headers,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_is_reset_minus_now() {
        assert_eq!(retry_wait_ms(1_700_000_010, 1_700_000_000_000), 10_000);
    }

    #[test]
    fn wait_non_positive_when_reset_already_passed() {
        assert_eq!(retry_wait_ms(1_700_000_000, 1_700_000_000_000), 0);
        assert!(retry_wait_ms(1_699_999_999, 1_700_000_000_000) < 0);
    }

    #[test]
    fn system_clock_is_epoch_ms() {
        // Sanity bound: somewhere between 2020 and 2100.
        let now = SystemClock.now_ms();
        assert!(now > 1_577_836_800_000);
        assert!(now < 4_102_444_800_000);
    }
}
