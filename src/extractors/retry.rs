//! Exponential backoff around any [`Extract`] implementation.
//!
//! - Only errors where [`ExtractError::is_transient`] holds are retried
//! - Delay doubles from `base_delay`, capped at 30 seconds
//! - Random jitter (0-250ms) is added to each delay

use super::Extract;
use crate::errors::ExtractError;
use crate::models::{ArticleResult, ExtractOptions};
use rand::{Rng, rng};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Decorator that retries transient extraction failures.
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct Retry<E> {
    inner: E,
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
    jitter: bool,
}

impl<E: Extract> Retry<E> {
    /// Wrap `inner`, allowing up to `max_retries` extra attempts per URL.
    pub fn new(inner: E, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }

    #[cfg(test)]
    fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    fn delay_for(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(16) as u32;
        let delay = self
            .base_delay
            .saturating_mul(1 << shift)
            .min(self.max_delay);
        if self.jitter {
            let jitter_ms: u64 = rng().random_range(0..=250);
            delay + Duration::from_millis(jitter_ms)
        } else {
            delay
        }
    }
}

impl<E> fmt::Debug for Retry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<E: Extract> Extract for Retry<E> {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn extract(
        &self,
        url: &str,
        options: &ExtractOptions,
    ) -> Result<ArticleResult, ExtractError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.extract(url, options).await {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        if self.max_retries > 0 {
                            error!(
                                attempt,
                                max = self.max_retries,
                                elapsed_ms_total = total_dt.as_millis() as u64,
                                error = %e,
                                "extract() exhausted retries"
                            );
                        }
                        return Err(e);
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "extract() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails with the given status a fixed number of times, then succeeds.
    struct Flaky {
        failures: usize,
        status: u16,
        calls: AtomicUsize,
    }

    impl Extract for Flaky {
        async fn extract(
            &self,
            url: &str,
            _options: &ExtractOptions,
        ) -> Result<ArticleResult, ExtractError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(ExtractError::Status {
                    status: self.status,
                })
            } else {
                Ok(ArticleResult {
                    url: url.to_string(),
                    content: "ok".to_string(),
                    ..Default::default()
                })
            }
        }
    }

    fn flaky(failures: usize, status: u16) -> Flaky {
        Flaky {
            failures,
            status,
            calls: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn test_retries_transient_errors() {
        let retry = Retry::new(flaky(2, 503), 3, Duration::from_millis(1)).without_jitter();
        let result = retry
            .extract("https://example.com", &ExtractOptions::default())
            .await
            .unwrap();
        assert_eq!(result.content, "ok");
        assert_eq!(retry.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let retry = Retry::new(flaky(10, 502), 2, Duration::from_millis(1)).without_jitter();
        let err = retry
            .extract("https://example.com", &ExtractOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Status { status: 502 }));
        assert_eq!(retry.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let retry = Retry::new(flaky(10, 404), 5, Duration::from_millis(1)).without_jitter();
        assert!(retry
            .extract("https://example.com", &ExtractOptions::default())
            .await
            .is_err());
        assert_eq!(retry.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let retry = Retry::new(flaky(0, 500), 5, Duration::from_secs(1)).without_jitter();
        assert_eq!(retry.delay_for(1), Duration::from_secs(1));
        assert_eq!(retry.delay_for(2), Duration::from_secs(2));
        assert_eq!(retry.delay_for(3), Duration::from_secs(4));
        assert_eq!(retry.delay_for(10), Duration::from_secs(30));
    }
}
