//! Bounded exponential backoff for retryable AI failures.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use conciliar_core::classification::AiError;

/// How often and how long to wait before retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on every further retry.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before retry number `retry` (starting at 0).
    #[must_use]
    pub fn delay(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(retry.min(16)))
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable
    /// error, or the retries are used up.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, AiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AiError>>,
    {
        let mut retry = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && retry < self.max_retries => {
                    let delay = self.delay(retry);
                    warn!(
                        error = %err,
                        retry = retry + 1,
                        max_retries = self.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "AI request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::ZERO)
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::new(3, Duration::from_millis(500));
        assert_eq!(policy.delay(0), Duration::from_millis(500));
        assert_eq!(policy.delay(1), Duration::from_millis(1000));
        assert_eq!(policy.delay(2), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn test_transient_retried_until_success() {
        let attempts = AtomicU32::new(0);
        let counter = &attempts;
        let result = quick(2)
            .run(move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(AiError::Transient("503".into()))
                } else {
                    Ok("ok")
                }
            })
            .await;
        assert_eq!(result, Ok("ok"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let attempts = AtomicU32::new(0);
        let counter = &attempts;
        let result: Result<(), _> = quick(2)
            .run(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(AiError::RateLimited("429".into()))
            })
            .await;
        assert!(matches!(result, Err(AiError::RateLimited(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_quota_not_retried() {
        let attempts = AtomicU32::new(0);
        let counter = &attempts;
        let result: Result<(), _> = quick(5)
            .run(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(AiError::QuotaExceeded("billing".into()))
            })
            .await;
        assert!(matches!(result, Err(AiError::QuotaExceeded(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
