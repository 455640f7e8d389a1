//! Error types for the client crate.
//!
//! The taxonomy mirrors how callers need to react:
//! - `TransportError`: lowest-level failure raised by an [`HttpTransport`]
//!   implementation (non-2xx status, DNS failure, timeout)
//! - `ExecutorError`: what the executor surfaces to its caller, with the
//!   original status code and response body preserved for diagnostics
//!
//! [`HttpTransport`]: crate::transport::HttpTransport

use serde_json::Value as JsonValue;
use std::fmt;

/// A failed transport-level request.
///
/// `status` is `None` when the request never produced an HTTP response
/// (connection refused, DNS failure, timeout). `body` carries whatever the
/// server returned, decoded as JSON where possible, so rate-limit metadata
/// such as `retry_after` stays available to retry policies.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportError {
    /// HTTP status code, if a response was received.
    pub status: Option<u16>,
    /// Decoded response body (`Null` when there was none).
    pub body: JsonValue,
    /// Human-readable failure description.
    pub reason: String,
}

impl TransportError {
    /// Creates an error for a response with a non-success status.
    #[must_use]
    pub fn status(status: u16, body: JsonValue) -> Self {
        Self {
            status: Some(status),
            body,
            reason: format!("http status {status}"),
        }
    }

    /// Creates an error for a failure below the HTTP layer.
    #[must_use]
    pub fn network(reason: impl Into<String>) -> Self {
        Self {
            status: None,
            body: JsonValue::Null,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "transport error (status {status}): {}", self.reason),
            None => write!(f, "transport error: {}", self.reason),
        }
    }
}

impl std::error::Error for TransportError {}

/// Errors surfaced by [`Executor`](crate::executor::Executor).
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutorError {
    /// Missing or invalid credential, or an unusable request spec.
    /// Never retried; raised before any network call is attempted.
    Configuration { reason: String },
    /// The request reached the transport and failed. Status and body are
    /// preserved verbatim so the host can render a useful message.
    Api { status: Option<u16>, body: JsonValue },
    /// Rate-limit responses persisted past the retry budget.
    RetryExhausted { attempts: u32 },
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { reason } => {
                write!(f, "invalid configuration: {reason}")
            }
            Self::Api { status, body } => match status {
                Some(status) => write!(f, "api request failed (status {status}): {body}"),
                None => write!(f, "api request failed: {body}"),
            },
            Self::RetryExhausted { attempts } => {
                write!(
                    f,
                    "could not deliver request: max rate-limit retries reached ({attempts} attempts)"
                )
            }
        }
    }
}

impl std::error::Error for ExecutorError {}

impl From<TransportError> for ExecutorError {
    fn from(e: TransportError) -> Self {
        Self::Api {
            status: e.status,
            body: e.body,
        }
    }
}
