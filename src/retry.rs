//! Retry policy, backoff delay calculation, and the retry executor.
//!
//! [`with_retry`] runs an arbitrary fallible async operation under a
//! [`RetryPolicy`] with exponential backoff and jitter. The executor knows
//! nothing about the operation and holds no monitor reference; callers
//! observe retry decisions through the `on_retry` callback.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::telemetry;
use crate::{HuginnError, Result};

/// Fraction of the computed delay added as uniform random jitter.
const JITTER_FRACTION: f64 = 0.3;

/// Predicate deciding whether an error is worth another attempt.
pub type RetryPredicate = fn(&HuginnError) -> bool;

/// Configuration for retry behaviour on provider errors.
///
/// Uses exponential backoff with uniform jitter in `[0, 0.3 * delay)`:
///
/// ```rust
/// # use huginn::RetryPolicy;
/// # use std::time::Duration;
/// let policy = RetryPolicy::new()
///     .max_attempts(5)
///     .base_delay(Duration::from_millis(200));
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial request).
    /// 0 and 1 both mean a single attempt. Default: 3.
    pub max_attempts: u32,
    /// Base delay before the first retry. Default: 2s.
    pub base_delay: Duration,
    /// Maximum delay between retries (caps exponential growth). Default: 30s.
    pub max_delay: Duration,
    /// Which errors are retriable. Default: [`HuginnError::is_transient`].
    pub retry_if: RetryPredicate,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            retry_if: HuginnError::is_transient,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the base delay before the first retry.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Override the retry predicate.
    pub fn retry_if(mut self, predicate: RetryPredicate) -> Self {
        self.retry_if = predicate;
        self
    }

    /// Calculate the backoff delay for a given attempt number (0-indexed),
    /// without jitter.
    ///
    /// Exponential: `base_delay * 2^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }

    /// Calculate the full delay for an attempt: exponential backoff plus
    /// uniform random jitter in `[0, 0.3 * delay)`.
    ///
    /// A provider `retry_after` hint, when present, replaces the backoff
    /// base (jitter still applies).
    pub fn jittered_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let base = retry_after.unwrap_or_else(|| self.delay_for_attempt(attempt));
        let jitter_cap = base.as_secs_f64() * JITTER_FRACTION;
        if jitter_cap <= 0.0 {
            return base;
        }
        let jitter = rand::thread_rng().gen_range(0.0..jitter_cap);
        base + Duration::from_secs_f64(jitter)
    }
}

/// Execute an async operation under a retry policy.
///
/// Attempts `f` up to `policy.max_attempts` times (at least once). After a
/// failure, the error propagates unchanged when the predicate rejects it or
/// this was the final attempt; otherwise `on_retry(attempt, &err)` fires,
/// the executor sleeps for the jittered backoff delay, and the operation
/// runs again. The sleep is local to this invocation's control flow and
/// never blocks concurrent work.
pub async fn with_retry<F, Fut, T, R>(
    policy: &RetryPolicy,
    operation: &str,
    on_retry: R,
    f: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
    R: Fn(u32, &HuginnError),
{
    let attempts = policy.max_attempts.max(1);
    let mut last_err = None;
    for attempt in 0..attempts {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if (policy.retry_if)(&e) && attempt + 1 < attempts => {
                metrics::counter!(telemetry::RETRIES_TOTAL, "operation" => operation.to_owned())
                    .increment(1);
                on_retry(attempt, &e);
                let delay = policy.jittered_delay(attempt, e.retry_after());
                warn!(
                    operation,
                    attempt = attempt + 1,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "retrying after transient error"
                );
                tokio::time::sleep(delay).await;
                last_err = Some(e);
            }
            Err(e) => return Err(e), // permanent error or attempts exhausted
        }
    }
    // unreachable unless attempts == 0, which max(1) rules out
    Err(last_err.unwrap_or(HuginnError::NoProvider))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy_2s() -> RetryPolicy {
        RetryPolicy::new()
            .base_delay(Duration::from_secs(2))
            .max_delay(Duration::from_secs(30))
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = policy_2s();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(8));
    }

    #[test]
    fn backoff_caps_at_max_delay() {
        let policy = policy_2s();
        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(30));
    }

    #[test]
    fn jitter_stays_within_thirty_percent() {
        let policy = policy_2s();
        for _ in 0..200 {
            let d = policy.jittered_delay(0, None);
            assert!(d >= Duration::from_millis(2000), "{d:?}");
            assert!(d < Duration::from_millis(2600), "{d:?}");

            let d = policy.jittered_delay(1, None);
            assert!(d >= Duration::from_millis(4000), "{d:?}");
            assert!(d < Duration::from_millis(5200), "{d:?}");
        }
    }

    #[test]
    fn retry_after_hint_replaces_backoff_base() {
        let policy = policy_2s();
        let hint = Some(Duration::from_secs(10));
        for _ in 0..50 {
            let d = policy.jittered_delay(0, hint);
            assert!(d >= Duration::from_secs(10));
            assert!(d < Duration::from_secs(13));
        }
    }

    #[test]
    fn zero_delay_produces_no_jitter() {
        let policy = RetryPolicy::new().base_delay(Duration::ZERO);
        assert_eq!(policy.jittered_delay(0, None), Duration::ZERO);
    }
}
