//! Fixed-interval polling with a deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

/// Poll `probe` until it yields a value or `timeout` elapses.
///
/// The probe distinguishes "nothing yet" (`Ok(None)`, keep polling) from a
/// hard failure (`Err`, abort the wait immediately). All waiting in the
/// kernel is this shape: blocking poll-with-timeout, no suspension beyond
/// the interval sleeps.
pub async fn poll_until<T, E, F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<Option<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = probe().await? {
            return Ok(Some(value));
        }
        if Instant::now() + interval > deadline {
            return Ok(None);
        }
        sleep(interval).await;
    }
}
