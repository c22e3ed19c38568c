//! Exponential backoff for idempotent calls.
//!
//! Only transport failures (connection refused, reset, timed out) are
//! retried. A response with any status, error or not, ends the loop and is
//! handed back for the caller to interpret. Mint, revoke, issue and bulk
//! never come through here.

use std::future::Future;
use std::time::Duration;

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait before the first retry; doubles for each one after.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `retry` (0-based).
    pub fn delay(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry))
    }
}

/// [`retry_send_with`] under the default policy: 200 ms, 400 ms, 800 ms.
pub(crate) async fn retry_send<F, Fut>(send: F) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    retry_send_with(RetryPolicy::default(), send).await
}

/// Call `send` until it yields a response or the retries run out. The last
/// transport error is returned when they do.
pub(crate) async fn retry_send_with<F, Fut>(
    policy: RetryPolicy,
    send: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut retry = 0;
    loop {
        let err = match send().await {
            Ok(resp) => return Ok(resp),
            Err(err) if retry >= policy.max_retries => return Err(err),
            Err(err) => err,
        };
        let delay = policy.delay(retry);
        retry += 1;
        tracing::warn!(
            retry,
            max_retries = policy.max_retries,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "transport failure, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn default_delays_double() {
        let policy = RetryPolicy::default();
        let delays: Vec<u128> = (0..3).map(|n| policy.delay(n).as_millis()).collect();
        assert_eq!(delays, vec![200, 400, 800]);
    }

    #[test]
    fn delay_saturates_instead_of_overflowing() {
        let policy = RetryPolicy {
            max_retries: 100,
            base_delay: Duration::from_secs(1),
        };
        assert!(policy.delay(64) >= policy.delay(10));
    }

    #[tokio::test]
    async fn transport_failures_use_every_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();

        // Port 1 refuses connections.
        let result = retry_send_with(policy, || {
            counter.fetch_add(1, Ordering::SeqCst);
            http.get("http://127.0.0.1:1/").send()
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
