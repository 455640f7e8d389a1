//! Rate-limit retry policy.
//!
//! Retry behaviour is a per-call-site value, not a property of the executor:
//! the webhook notification path retries 429s with a bounded budget, while
//! the scheduling API path attaches no policy and propagates the first error.
//! Keeping the policy as a standalone value makes it unit-testable without
//! any transport in the loop.

use crate::error::TransportError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;

/// How many attempts a send gets in total, including the first.
const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Backoff used when the server supplies no usable delay.
const DEFAULT_DELAY: Duration = Duration::from_millis(150);

/// Response body field carrying the server-requested delay, in milliseconds.
const DEFAULT_RETRY_AFTER_FIELD: &str = "retry_after";

/// Configuration for retrying rate-limited sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempt budget, including the initial attempt.
    pub max_attempts: u32,
    /// Delay between attempts when the server supplies none.
    pub default_delay: Duration,
    /// Status codes that trigger a retry; anything else propagates.
    pub retry_statuses: Vec<u16>,
    /// Body field read for a server-supplied delay in milliseconds.
    pub retry_after_field: String,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            default_delay: DEFAULT_DELAY,
            retry_statuses: vec![429],
            retry_after_field: DEFAULT_RETRY_AFTER_FIELD.to_string(),
        }
    }
}

impl RetryPolicy {
    /// The standard rate-limit policy: 5 attempts, 150 ms default delay,
    /// retry on 429 only.
    #[must_use]
    pub fn rate_limit() -> Self {
        Self::default()
    }

    /// Returns the standard policy with a different attempt budget.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Whether a failed attempt with this error should be retried.
    #[must_use]
    pub fn should_retry(&self, error: &TransportError) -> bool {
        error
            .status
            .is_some_and(|status| self.retry_statuses.contains(&status))
    }

    /// Delay before the next attempt, derived from the error body.
    ///
    /// Uses the server-supplied field when it is present, numeric and
    /// strictly positive; zero and negative values are treated as invalid
    /// and fall back to the default.
    #[must_use]
    pub fn backoff_delay(&self, body: &JsonValue) -> Duration {
        match body.get(&self.retry_after_field).and_then(JsonValue::as_f64) {
            Some(ms) if ms > 0.0 => Duration::from_millis(ms as u64),
            _ => self.default_delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_policy_matches_rate_limit_contract() {
        let policy = RetryPolicy::rate_limit();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.default_delay, Duration::from_millis(150));
        assert_eq!(policy.retry_statuses, vec![429]);
    }

    #[test]
    fn retries_only_configured_statuses() {
        let policy = RetryPolicy::rate_limit();

        assert!(policy.should_retry(&TransportError::status(429, JsonValue::Null)));
        assert!(!policy.should_retry(&TransportError::status(500, JsonValue::Null)));
        assert!(!policy.should_retry(&TransportError::network("connection reset")));
    }

    #[test]
    fn server_supplied_delay_is_used() {
        let policy = RetryPolicy::rate_limit();
        let delay = policy.backoff_delay(&json!({"retry_after": 200}));
        assert_eq!(delay, Duration::from_millis(200));
    }

    #[test]
    fn fractional_delay_is_truncated_to_millis() {
        let policy = RetryPolicy::rate_limit();
        let delay = policy.backoff_delay(&json!({"retry_after": 99.9}));
        assert_eq!(delay, Duration::from_millis(99));
    }

    #[test]
    fn missing_delay_falls_back_to_default() {
        let policy = RetryPolicy::rate_limit();
        assert_eq!(policy.backoff_delay(&json!({})), Duration::from_millis(150));
        assert_eq!(
            policy.backoff_delay(&JsonValue::Null),
            Duration::from_millis(150)
        );
    }

    #[test]
    fn zero_or_negative_delay_is_invalid() {
        let policy = RetryPolicy::rate_limit();
        assert_eq!(
            policy.backoff_delay(&json!({"retry_after": 0})),
            Duration::from_millis(150)
        );
        assert_eq!(
            policy.backoff_delay(&json!({"retry_after": -50})),
            Duration::from_millis(150)
        );
    }

    #[test]
    fn non_numeric_delay_is_invalid() {
        let policy = RetryPolicy::rate_limit();
        assert_eq!(
            policy.backoff_delay(&json!({"retry_after": "soon"})),
            Duration::from_millis(150)
        );
    }

    #[test]
    fn custom_attempt_budget() {
        let policy = RetryPolicy::rate_limit().with_max_attempts(3);
        assert_eq!(policy.max_attempts, 3);
    }
}
