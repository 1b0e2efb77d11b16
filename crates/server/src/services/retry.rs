//! Exponential backoff for transient upstream failures.

use std::time::Duration;

/// Retry schedule for upstream calls.
///
/// The delay before retry `n` (zero-based) is `initial_delay * multiplier^n`,
/// capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts per call, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Growth factor between delays.
    pub backoff_multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Default schedule with a custom attempt count. Zero is treated as one.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.saturating_pow(attempt);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Run `operation` until it succeeds, returns a non-retryable error, or the
/// policy's attempts are used up.
///
/// # Errors
///
/// Returns the last error seen.
pub async fn retry_with_backoff<F, Fut, T, E, R>(
    policy: &RetryPolicy,
    is_retryable: R,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    R: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(attempt = attempt + 1, "Upstream call succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => {
                attempt += 1;
                if attempt >= max_attempts || !is_retryable(&error) {
                    return Err(error);
                }

                let delay = policy.delay_for_attempt(attempt - 1);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %error,
                    "Upstream call failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
