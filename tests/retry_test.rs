//! Tests for the retry executor and backoff policy.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use huginn::{HuginnError, RetryPolicy, with_retry};

/// Fast policy so tests don't actually wait.
fn fast_policy() -> RetryPolicy {
    RetryPolicy::new()
        .max_attempts(3)
        .base_delay(Duration::from_millis(1))
        .max_delay(Duration::from_millis(5))
}

/// Run an operation that fails `failures` times with `fail_with`, then
/// succeeds. Returns (result, attempts made, retries observed).
async fn run_fail_then_succeed(
    policy: &RetryPolicy,
    failures: u32,
    fail_with: fn() -> HuginnError,
) -> (huginn::Result<&'static str>, u32, u32) {
    let calls = Arc::new(AtomicU32::new(0));
    let retries = Arc::new(AtomicU32::new(0));
    let calls_in = calls.clone();
    let retries_in = retries.clone();
    let result = with_retry(
        policy,
        "test",
        move |_, _| {
            retries_in.fetch_add(1, Ordering::Relaxed);
        },
        move || {
            let calls = calls_in.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::Relaxed);
                if n < failures {
                    Err(fail_with())
                } else {
                    Ok("ok")
                }
            }
        },
    )
    .await;
    (
        result,
        calls.load(Ordering::Relaxed),
        retries.load(Ordering::Relaxed),
    )
}

#[tokio::test]
async fn retries_quota_error_then_succeeds() {
    let (result, attempts, retries) = run_fail_then_succeed(&fast_policy(), 2, || {
        HuginnError::classify(None, "monthly quota exhausted")
    })
    .await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(attempts, 3); // 2 failures + 1 success
    assert_eq!(retries, 2);
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let (result, attempts, _) = run_fail_then_succeed(&fast_policy(), 10, || {
        HuginnError::ProviderUnreachable("timed out".into())
    })
    .await;

    assert!(matches!(result, Err(HuginnError::ProviderUnreachable(_))));
    assert_eq!(attempts, 3);
}

#[tokio::test]
async fn invalid_request_surfaces_on_first_attempt() {
    let (result, attempts, retries) = run_fail_then_succeed(&fast_policy(), 10, || {
        HuginnError::InvalidRequest("status 400".into())
    })
    .await;

    assert!(matches!(result, Err(HuginnError::InvalidRequest(_))));
    assert_eq!(attempts, 1);
    assert_eq!(retries, 0);
}

#[tokio::test]
async fn error_propagates_unchanged() {
    let (result, _, _) = run_fail_then_succeed(&fast_policy(), 10, || {
        HuginnError::Provider("upstream hiccup".into())
    })
    .await;

    match result {
        Err(HuginnError::Provider(msg)) => assert_eq!(msg, "upstream hiccup"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn zero_max_attempts_still_runs_once() {
    let policy = fast_policy().max_attempts(0);
    let (result, attempts, retries) = run_fail_then_succeed(&policy, 0, || {
        HuginnError::Provider("unused".into())
    })
    .await;

    assert!(result.is_ok());
    assert_eq!(attempts, 1);
    assert_eq!(retries, 0);
}

#[tokio::test]
async fn single_attempt_never_retries_transient_errors() {
    let policy = fast_policy().max_attempts(1);
    let (result, attempts, retries) = run_fail_then_succeed(&policy, 10, || {
        HuginnError::QuotaExceeded { retry_after: None }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(attempts, 1);
    assert_eq!(retries, 0);
}

#[tokio::test]
async fn custom_predicate_overrides_default_gating() {
    // treat everything as permanent
    let policy = fast_policy().retry_if(|_| false);
    let (result, attempts, _) = run_fail_then_succeed(&policy, 10, || {
        HuginnError::QuotaExceeded { retry_after: None }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(attempts, 1);
}

#[test]
fn backoff_bounds_with_production_defaults() {
    // max_attempts = 3, base 2000ms, max 30000ms: delay before attempt 2
    // lies in [2000, 2600), before attempt 3 in [4000, 5200)
    let policy = RetryPolicy::new()
        .max_attempts(3)
        .base_delay(Duration::from_millis(2000))
        .max_delay(Duration::from_millis(30000));
    for _ in 0..500 {
        let first = policy.jittered_delay(0, None);
        assert!((Duration::from_millis(2000)..Duration::from_millis(2600)).contains(&first));
        let second = policy.jittered_delay(1, None);
        assert!((Duration::from_millis(4000)..Duration::from_millis(5200)).contains(&second));
    }
}
