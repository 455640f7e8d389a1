//! The authenticated request executor.
//!
//! Turns a [`RequestSpec`] into exactly one network call — plus bounded
//! retries for rate-limit responses when a [`RetryPolicy`] is attached —
//! and returns the decoded response body or a typed error. The executor
//! performs no caching, no deduplication, and never logs on the caller's
//! behalf beyond tracing diagnostics.

use crate::credential::ApiCredential;
use crate::error::ExecutorError;
use crate::request::RequestSpec;
use crate::retry::RetryPolicy;
use crate::transport::HttpTransport;
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};

/// Success marker returned by the retrying send path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReceipt {
    /// Number of attempts made, including the successful one.
    pub attempts: u32,
}

/// Executes resolved requests through an injected transport.
///
/// Each invocation is independent: no shared mutable state lives here, so
/// the host may run executors concurrently across input items.
#[derive(Debug)]
pub struct Executor<T: HttpTransport> {
    transport: T,
}

impl<T: HttpTransport> Executor<T> {
    /// Creates an executor over the given transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Sends the request once and returns the decoded response body.
    ///
    /// The body is returned unchanged; response shape is the caller's
    /// concern. Any transport failure propagates immediately as
    /// `ExecutorError::Api` with the original status and body — no retry.
    ///
    /// # Errors
    ///
    /// `Configuration` when the spec cannot be resolved (missing or invalid
    /// credential, checked before any network call); `Api` on transport
    /// failure.
    #[instrument(skip(self, spec, credential), fields(method = %spec.method(), target = %spec.target()))]
    pub async fn send(
        &self,
        spec: &RequestSpec,
        credential: Option<&ApiCredential>,
    ) -> Result<JsonValue, ExecutorError> {
        let resolved = spec.resolve(credential)?;
        let response = self.transport.execute(&resolved).await?;

        debug!(status = response.status, "request completed");
        Ok(response.body)
    }

    /// Sends the request, retrying rate-limited attempts per the policy.
    ///
    /// A retryable failure waits the policy's backoff delay (server-supplied
    /// when valid, default otherwise) and tries again until the attempt
    /// budget is spent. Any non-retryable failure propagates immediately.
    /// The wait is a `tokio::time::sleep`, so cancelling the enclosing
    /// future abandons both the backoff and any in-flight call.
    ///
    /// # Errors
    ///
    /// `Configuration` when the spec cannot be resolved; `Api` on a
    /// non-retryable failure; `RetryExhausted` when retryable failures
    /// persist past the budget.
    #[instrument(skip(self, spec, credential, policy), fields(method = %spec.method(), target = %spec.target()))]
    pub async fn send_with_retry(
        &self,
        spec: &RequestSpec,
        credential: Option<&ApiCredential>,
        policy: &RetryPolicy,
    ) -> Result<SendReceipt, ExecutorError> {
        let resolved = spec.resolve(credential)?;

        let mut attempt = 0;
        // The budget counts the first attempt, so it is never less than one.
        let mut attempts_remaining = policy.max_attempts.max(1);
        loop {
            attempt += 1;
            match self.transport.execute(&resolved).await {
                Ok(response) => {
                    debug!(status = response.status, attempt, "request completed");
                    return Ok(SendReceipt { attempts: attempt });
                }
                Err(error) if policy.should_retry(&error) => {
                    attempts_remaining -= 1;
                    if attempts_remaining == 0 {
                        return Err(ExecutorError::RetryExhausted {
                            attempts: policy.max_attempts,
                        });
                    }
                    let delay = policy.backoff_delay(&error.body);
                    debug!(
                        status = ?error.status,
                        delay_ms = delay.as_millis() as u64,
                        attempt,
                        "rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::request::Method;
    use crate::transport::{MockTransport, TransportResponse};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn credential() -> ApiCredential {
        ApiCredential::new("key-123", "2.0", "42", "acme")
    }

    fn rate_limited(body: JsonValue) -> Result<TransportResponse, TransportError> {
        Err(TransportError::status(429, body))
    }

    #[tokio::test]
    async fn send_returns_body_unchanged() {
        let transport = Arc::new(MockTransport::succeeding(
            json!({"Result": [{"Id": 1}], "TotalCount": 1}),
        ));
        let executor = Executor::new(transport.clone());

        let spec = RequestSpec::api(Method::Get, "/Things");
        let body = executor.send(&spec, Some(&credential())).await.unwrap();

        assert_eq!(body, json!({"Result": [{"Id": 1}], "TotalCount": 1}));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn send_wraps_transport_failure_without_retry() {
        let transport = Arc::new(MockTransport::always_failing(TransportError::status(
            404,
            json!({"Message": "not found"}),
        )));
        let executor = Executor::new(transport.clone());

        let spec = RequestSpec::api(Method::Get, "/Things");
        let err = executor.send(&spec, Some(&credential())).await.unwrap_err();

        assert_eq!(
            err,
            ExecutorError::Api {
                status: Some(404),
                body: json!({"Message": "not found"}),
            }
        );
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn missing_credential_fails_before_any_network_call() {
        let transport = Arc::new(MockTransport::succeeding(JsonValue::Null));
        let executor = Executor::new(transport.clone());

        let spec = RequestSpec::api(Method::Get, "/Things");
        let err = executor.send(&spec, None).await.unwrap_err();

        assert!(matches!(err, ExecutorError::Configuration { .. }));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn retry_respects_server_supplied_delay() {
        let transport = Arc::new(MockTransport::scripted([
            rate_limited(json!({"retry_after": 200})),
            rate_limited(json!({"retry_after": 200})),
            Ok(TransportResponse::ok(JsonValue::Null)),
        ]));
        let executor = Executor::new(transport.clone());
        let spec = RequestSpec::absolute(Method::Post, "https://example.com/hook");

        let started = Instant::now();
        let receipt = executor
            .send_with_retry(&spec, None, &RetryPolicy::rate_limit())
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(receipt, SendReceipt { attempts: 3 });
        assert_eq!(transport.call_count(), 3);
        // Two waits of ~200ms each.
        assert!(elapsed >= Duration::from_millis(380), "waited {elapsed:?}");
        assert!(elapsed < Duration::from_secs(2), "waited {elapsed:?}");
    }

    #[tokio::test]
    async fn retry_exhaustion_uses_default_delay_and_full_budget() {
        let transport = Arc::new(MockTransport::always_failing(TransportError::status(
            429,
            JsonValue::Null,
        )));
        let executor = Executor::new(transport.clone());
        let spec = RequestSpec::absolute(Method::Post, "https://example.com/hook");
        let policy = RetryPolicy::rate_limit().with_max_attempts(3);

        let started = Instant::now();
        let err = executor
            .send_with_retry(&spec, None, &policy)
            .await
            .unwrap_err();
        let elapsed = started.elapsed();

        assert_eq!(err, ExecutorError::RetryExhausted { attempts: 3 });
        assert_eq!(transport.call_count(), 3);
        // Two waits of the 150ms default.
        assert!(elapsed >= Duration::from_millis(280), "waited {elapsed:?}");
    }

    #[tokio::test]
    async fn non_retryable_status_propagates_immediately() {
        let transport = Arc::new(MockTransport::scripted([Err(TransportError::status(
            500,
            json!({"message": "boom"}),
        ))]));
        let executor = Executor::new(transport.clone());
        let spec = RequestSpec::absolute(Method::Post, "https://example.com/hook");

        let err = executor
            .send_with_retry(&spec, None, &RetryPolicy::rate_limit())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ExecutorError::Api {
                status: Some(500),
                body: json!({"message": "boom"}),
            }
        );
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn invalid_retry_after_falls_back_to_default_delay() {
        let transport = Arc::new(MockTransport::scripted([
            rate_limited(json!({"retry_after": 0})),
            Ok(TransportResponse::ok(JsonValue::Null)),
        ]));
        let executor = Executor::new(transport.clone());
        let spec = RequestSpec::absolute(Method::Post, "https://example.com/hook");

        let started = Instant::now();
        let receipt = executor
            .send_with_retry(&spec, None, &RetryPolicy::rate_limit())
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(receipt.attempts, 2);
        // One wait of the 150ms default, not a zero-length wait.
        assert!(elapsed >= Duration::from_millis(140), "waited {elapsed:?}");
    }

    #[tokio::test]
    async fn retry_path_checks_credential_before_any_network_call() {
        let transport = Arc::new(MockTransport::succeeding(JsonValue::Null));
        let executor = Executor::new(transport.clone());

        let spec = RequestSpec::api(Method::Post, "/Things");
        let err = executor
            .send_with_retry(&spec, None, &RetryPolicy::rate_limit())
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutorError::Configuration { .. }));
        assert_eq!(transport.call_count(), 0);
    }
}
