use crate::IngestionError;

use std::time::Duration;

/// The cap on the backoff exponent.
const MAX_BACKOFF_EXPONENT: u32 = 10;

/// A trait for errors that can indicate whether an operation can be retried.
pub trait CanRetry {
    /// Returns true if the implementer can be retried.
    fn can_retry(&self) -> bool;
}

impl CanRetry for IngestionError {
    fn can_retry(&self) -> bool {
        self.is_transport()
    }
}

/// The decision of the [`RetryPolicy`] for a failed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the range after the delay.
    Retry(Duration),
    /// Surface the error as fatal.
    Escalate,
}

/// The retry policy for failing ranges.
///
/// Retryable errors are retried with exponential backoff up to `max_retries` times, or
/// indefinitely in tolerant mode. Other errors are escalated at once, or retried up to
/// `max_retries` times in tolerant mode.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    tolerant: bool,
    max_retries: usize,
    backoff: Duration,
    attempts: usize,
}

impl RetryPolicy {
    /// Returns a new [`RetryPolicy`].
    pub const fn new(tolerant: bool, max_retries: usize, backoff: Duration) -> Self {
        Self { tolerant, max_retries, backoff, attempts: 0 }
    }

    /// Returns the count of failed attempts since the last reset.
    pub const fn attempts(&self) -> usize {
        self.attempts
    }

    /// Resets the attempts, called once a range succeeds.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Records a failure and returns the decision for the range.
    pub fn on_failure<E: CanRetry>(&mut self, error: &E) -> RetryDecision {
        let bounded = match (error.can_retry(), self.tolerant) {
            (true, true) => false,
            (true, false) | (false, true) => true,
            (false, false) => return RetryDecision::Escalate,
        };
        if bounded && self.attempts >= self.max_retries {
            return RetryDecision::Escalate
        }

        let exponent = (self.attempts as u32).min(MAX_BACKOFF_EXPONENT);
        self.attempts += 1;
        RetryDecision::Retry(self.backoff.saturating_mul(2u32.pow(exponent)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Transient(bool);

    impl CanRetry for Transient {
        fn can_retry(&self) -> bool {
            self.0
        }
    }

    const BACKOFF: Duration = Duration::from_millis(100);

    #[test]
    fn test_should_backoff_then_escalate_transient_errors() {
        let mut policy = RetryPolicy::new(false, 3, BACKOFF);

        assert_eq!(policy.on_failure(&Transient(true)), RetryDecision::Retry(BACKOFF));
        assert_eq!(policy.on_failure(&Transient(true)), RetryDecision::Retry(BACKOFF * 2));
        assert_eq!(policy.on_failure(&Transient(true)), RetryDecision::Retry(BACKOFF * 4));
        assert_eq!(policy.on_failure(&Transient(true)), RetryDecision::Escalate);
    }

    #[test]
    fn test_should_escalate_fatal_errors_when_not_tolerant() {
        let mut policy = RetryPolicy::new(false, 3, BACKOFF);
        assert_eq!(policy.on_failure(&Transient(false)), RetryDecision::Escalate);
    }

    #[test]
    fn test_should_bound_fatal_errors_when_tolerant() {
        let mut policy = RetryPolicy::new(true, 2, BACKOFF);

        assert!(matches!(policy.on_failure(&Transient(false)), RetryDecision::Retry(_)));
        assert!(matches!(policy.on_failure(&Transient(false)), RetryDecision::Retry(_)));
        assert_eq!(policy.on_failure(&Transient(false)), RetryDecision::Escalate);

        policy.reset();
        assert_eq!(policy.attempts(), 0);
        assert_eq!(policy.on_failure(&Transient(false)), RetryDecision::Retry(BACKOFF));
    }

    #[test]
    fn test_should_retry_transient_errors_forever_when_tolerant() {
        let mut policy = RetryPolicy::new(true, 2, BACKOFF);

        for _ in 0..50 {
            assert!(matches!(policy.on_failure(&Transient(true)), RetryDecision::Retry(_)));
        }
        assert_eq!(
            policy.on_failure(&Transient(true)),
            RetryDecision::Retry(BACKOFF * 2u32.pow(MAX_BACKOFF_EXPONENT))
        );
    }
}
