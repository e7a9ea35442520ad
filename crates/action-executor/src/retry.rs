//! Bounded-attempt combinator.
//!
//! One retry shape for the whole kernel: attempt count and delay come
//! from a [`RetryPolicy`], the caller supplies the transient-vs-fatal
//! classification. Both the element locator's waits and the executor's
//! interactions go through here instead of growing ad hoc loops.

use std::future::Future;

use coursepilot_core_types::RetryPolicy;
use tokio::time::sleep;
use tracing::warn;

/// Run `op` until it succeeds, a non-transient error occurs, or the
/// policy's attempts are exhausted. The last error is returned as-is.
pub async fn run_with_retries<T, E, F, Fut, C>(
    policy: &RetryPolicy,
    what: &str,
    is_transient: C,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.total_attempts() && is_transient(&err) => {
                warn!(
                    "{what}: attempt {attempt}/{} failed: {err}, retrying in {:?}",
                    policy.total_attempts(),
                    policy.retry_delay
                );
                sleep(policy.retry_delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn quick_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(5))
    }

    #[tokio::test]
    async fn transient_errors_are_retried_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> =
            run_with_retries(&quick_policy(3), "flaky op", |_| true, || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err("transient".to_string())
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_transient_errors_fail_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> =
            run_with_retries(&quick_policy(5), "doomed op", |_| false, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("fatal".to_string())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn attempts_are_bounded_by_policy() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> =
            run_with_retries(&quick_policy(2), "always failing", |_| true, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("transient".to_string())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
