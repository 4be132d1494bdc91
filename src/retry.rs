//! Bounded retry policy for transient network failures.
//!
//! Kept separate from the clients so attempt counting and give-up
//! behavior can be tested without a network.

use std::future::Future;
use std::time::Duration;

use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Run `operation` up to `max_attempts` times, sleeping an
    /// exponentially growing, jittered delay between attempts. Errors the
    /// `retryable` predicate rejects propagate immediately. The operation
    /// receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(
        &self,
        mut operation: F,
        retryable: impl Fn(&E) -> bool,
    ) -> Result<T, E>
    where
        E: std::fmt::Display,
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut delays = ExponentialBackoff::from_millis(self.base_delay.as_millis().max(1) as u64)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.max_attempts - 1);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.max_attempts && retryable(&error) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        %error,
                        "attempt failed, retrying"
                    );
                    if let Some(delay) = delays.next() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(error) => return Err(error),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}
