//! Bounded retry with linear backoff.

use std::future::Future;
use std::time::Duration;

use sl_core::Classify;
use tracing::warn;

pub const DEFAULT_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_millis(500);

/// Retry policy: `attempts` tries in total, waiting `unit * n` after the
/// n-th failed try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            unit: DEFAULT_BACKOFF_UNIT,
        }
    }
}

/// What one try produced.
pub enum Attempt<T, E> {
    Done(T),
    /// Not settled yet; counts as a failed try.
    Again,
    Failed(E),
}

impl RetryPolicy {
    pub fn new(attempts: u32, unit: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            unit,
        }
    }

    /// Wait after the `attempt`-th failure (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.unit * attempt
    }

    /// Run `op` until it is done, fails with a non-retryable error, or the
    /// attempts run out.
    ///
    /// Returns `Ok(None)` when every try came back `Again`; the last
    /// retryable error is returned when the final try failed with one.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<Option<T>, E>
    where
        E: Classify + std::fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Attempt<T, E>>,
    {
        let attempts = self.attempts.max(1);
        for attempt in 1..=attempts {
            match op(attempt).await {
                Attempt::Done(value) => return Ok(Some(value)),
                Attempt::Failed(err) if !err.class().is_retryable() => return Err(err),
                Attempt::Failed(err) if attempt == attempts => return Err(err),
                Attempt::Failed(err) => {
                    warn!(operation = label, attempt, error = %err, "Retrying after transient failure");
                }
                Attempt::Again => {
                    if attempt == attempts {
                        return Ok(None);
                    }
                }
            }
            tokio::time::sleep(self.delay_after(attempt)).await;
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_core::ports::UploadError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn backoff_is_linear() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(500));
        assert_eq!(policy.delay_after(2), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_are_retried_up_to_the_bound() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<Option<()>, UploadError> = RetryPolicy::default()
            .run("test", move |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Attempt::Failed(UploadError::Transient("timeout".into()))
                }
            })
            .await;

        assert!(matches!(result, Err(UploadError::Transient(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_stops_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<Option<()>, UploadError> = RetryPolicy::default()
            .run("test", move |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Attempt::Failed(UploadError::Unauthorized)
                }
            })
            .await;

        assert!(matches!(result, Err(UploadError::Unauthorized)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn settles_on_a_later_attempt() {
        let result: Result<Option<u32>, UploadError> = RetryPolicy::default()
            .run("test", |attempt| async move {
                if attempt < 3 {
                    Attempt::Again
                } else {
                    Attempt::Done(attempt)
                }
            })
            .await;

        assert_eq!(result.unwrap(), Some(3));
    }
}
