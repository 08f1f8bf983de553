//! Retry policy for failed loads
//!
//! Transient failures (network errors, 5xx) are retried with exponential
//! backoff. Client errors (4xx) are terminal: retrying a 404 or a 422
//! will not change the answer.

use std::time::Duration;

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
    /// Upper bound on any single delay.
    pub cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2,
            cap: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before the retry following failure number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = self.base_delay * self.multiplier.saturating_pow(attempt);
        delay.min(self.cap)
    }

    /// Whether this error class is worth retrying at all.
    pub fn is_retryable(&self, error: &ApiError) -> bool {
        !error.is_client_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_grow_exponentially() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(2), Duration::from_secs(4));
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(10), Duration::from_secs(30));
    }

    #[test]
    fn test_client_errors_are_terminal() {
        let policy = RetryPolicy::default();
        assert!(!policy.is_retryable(&ApiError::not_found("Shipment not found")));
        assert!(!policy.is_retryable(&ApiError::http(422, "Validation failed")));
    }

    #[test]
    fn test_transient_errors_are_retryable() {
        let policy = RetryPolicy::default();
        assert!(policy.is_retryable(&ApiError::network("connection refused")));
        assert!(policy.is_retryable(&ApiError::http(503, "Service unavailable")));
    }

    #[test]
    fn test_none_never_retries() {
        assert_eq!(RetryPolicy::none().max_retries, 0);
    }
}
