use std::future::Future;
use std::time::Duration;

use crate::shared::station_api::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Client errors other than timeouts and rate limits will not change on retry
fn is_permanent(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Status { status, .. }) => {
            (400..500).contains(status) && *status != 408 && *status != 429
        }
        _ => false,
    }
}

/// Runs `op` until it succeeds, sleeping `policy.delay` between attempts.
pub async fn retry_fixed<T, F, Fut>(policy: RetryPolicy, label: &str, mut op: F) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if is_permanent(&e) => {
                tracing::warn!("{}: permanent error, not retrying: {}", label, e);
                return Err(e);
            }
            Err(e) if attempt >= policy.max_attempts => {
                return Err(e.context(format!(
                    "{} failed after {} attempts",
                    label, policy.max_attempts
                )));
            }
            Err(e) => {
                tracing::warn!(
                    "{}: attempt {}/{} failed: {}",
                    label,
                    attempt,
                    policy.max_attempts,
                    e
                );
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast(max: u32) -> RetryPolicy {
        RetryPolicy::new(max, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result = retry_fixed(fast(5), "flaky", || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    anyhow::bail!("connection reset")
                }
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: anyhow::Result<()> = retry_fixed(fast(3), "always-down", || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                anyhow::bail!("timeout")
            }
        })
        .await;

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("always-down failed after 3 attempts"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: anyhow::Result<()> = retry_fixed(fast(10), "bad-request", || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::Status {
                    status: 404,
                    body: "not found".into(),
                }
                .into())
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rate_limits_are_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let _ = retry_fixed(fast(3), "throttled", || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(
                    ApiError::Status {
                        status: 429,
                        body: String::new(),
                    }
                    .into(),
                )
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
