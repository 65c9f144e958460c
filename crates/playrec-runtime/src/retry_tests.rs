use super::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, PartialEq)]
enum Failure {
    Transient,
    Fatal,
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

fn transient(e: &Failure) -> bool {
    *e == Failure::Transient
}

#[test]
fn test_linear_backoff() {
    let backoff = Backoff::Linear(Duration::from_millis(2000));
    assert_eq!(backoff.delay(1), Duration::from_millis(2000));
    assert_eq!(backoff.delay(2), Duration::from_millis(4000));
    assert_eq!(backoff.delay(5), Duration::from_millis(10000));
}

#[test]
fn test_exponential_backoff_with_max() {
    let policy = RetryPolicy::exponential(5, Duration::from_millis(100), Duration::from_millis(500));
    assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
    assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
    assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
    // 100 * 2^3 = 800, but max is 500
    assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(500));
}

#[test]
fn test_attempt_zero_is_treated_as_first() {
    let backoff = Backoff::Linear(Duration::from_millis(10));
    assert_eq!(backoff.delay(0), Duration::from_millis(10));
}

#[tokio::test]
async fn test_success_on_first_try() {
    let policy = RetryPolicy::linear(3, Duration::from_millis(1));
    let result: Result<u32, RetryError<Failure>> =
        retry_with_backoff(&policy, transient, |attempt| async move { Ok(attempt) }).await;
    assert_eq!(result.unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_success_after_failures() {
    let calls = Arc::new(AtomicU32::new(0));
    let policy = RetryPolicy::linear(5, Duration::from_millis(2000));

    let started = tokio::time::Instant::now();
    let result = retry_with_backoff(&policy, transient, |_| {
        let calls = calls.clone();
        async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(Failure::Transient)
            } else {
                Ok("done")
            }
        }
    })
    .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // 2000 + 4000
    assert_eq!(started.elapsed(), Duration::from_millis(6000));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted() {
    let calls = Arc::new(AtomicU32::new(0));
    let policy = RetryPolicy::linear(5, Duration::from_millis(10));

    let result: Result<(), _> = retry_with_backoff(&policy, transient, |_| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Failure::Transient)
        }
    })
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.attempts, 5);
    assert_eq!(err.last_error, Failure::Transient);
    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert!(err.to_string().contains("5 attempt"));
}

#[tokio::test]
async fn test_non_retryable_stops_immediately() {
    let calls = Arc::new(AtomicU32::new(0));
    let policy = RetryPolicy::linear(5, Duration::from_secs(60));

    let result: Result<(), _> = retry_with_backoff(&policy, transient, |_| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Failure::Fatal)
        }
    })
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.attempts, 1);
    assert_eq!(err.last_error, Failure::Fatal);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_zero_attempts_still_runs_once() {
    let policy = RetryPolicy::linear(0, Duration::from_millis(1));
    let result: Result<u32, RetryError<Failure>> =
        retry_with_backoff(&policy, transient, |attempt| async move { Ok(attempt) }).await;
    assert_eq!(result.unwrap(), 1);
}
