//! HTTP transport abstraction.
//!
//! The executor never talks to the network directly; it hands a
//! [`ResolvedRequest`] to an injected [`HttpTransport`]. This keeps the
//! request-building and retry logic testable without any host runtime or
//! live endpoint — tests inject [`MockTransport`], production code uses
//! [`ReqwestTransport`].

use crate::error::TransportError;
use crate::request::{Method, ResolvedRequest};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A successful transport-level response.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code (always 2xx).
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Decoded response body (`Null` when the response was empty).
    pub body: JsonValue,
}

impl TransportResponse {
    /// Creates a 200 response with the given body.
    #[must_use]
    pub fn ok(body: JsonValue) -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body,
        }
    }
}

/// Trait for executing a resolved request.
///
/// Implementations must return `TransportError` with the status and decoded
/// body for any non-2xx response, and with `status: None` for failures below
/// the HTTP layer. The call must be cancellable: dropping the future
/// abandons the in-flight request.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Executes the request and returns the response.
    async fn execute(&self, request: &ResolvedRequest) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn execute(&self, request: &ResolvedRequest) -> Result<TransportResponse, TransportError> {
        (**self).execute(request).await
    }
}

/// Production transport backed by a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

/// Per-request timeout applied when none is configured explicitly.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

impl ReqwestTransport {
    /// Creates a transport with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be constructed.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a transport with an explicit per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be constructed.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::network(e.to_string()))?;
        Ok(Self { client })
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &ResolvedRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.into(), &request.uri);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(query) = &request.query {
            builder = builder.query(query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;
        let body = if bytes.is_empty() {
            JsonValue::Null
        } else {
            // Non-JSON bodies (error pages, plain text) are kept as strings
            // so diagnostics survive intact.
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                JsonValue::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        if !(200..300).contains(&status) {
            return Err(TransportError::status(status, body));
        }

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// A scripted transport for tests.
///
/// Records every request it receives and replays a programmed sequence of
/// results; once the script is exhausted it keeps returning the configured
/// fallback. Share it via `Arc` to inspect the call log after handing it to
/// an executor.
#[derive(Debug)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    fallback: Option<Result<TransportResponse, TransportError>>,
    calls: Mutex<Vec<ResolvedRequest>>,
}

impl MockTransport {
    /// Creates a mock that always succeeds with the given body.
    #[must_use]
    pub fn succeeding(body: JsonValue) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(Ok(TransportResponse::ok(body))),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock that always fails with the given error.
    #[must_use]
    pub fn always_failing(error: TransportError) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(Err(error)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock that replays the given results in order.
    ///
    /// Calls past the end of the script fail with a transport error, so a
    /// test that makes more calls than it programmed fails loudly.
    #[must_use]
    pub fn scripted(
        results: impl IntoIterator<Item = Result<TransportResponse, TransportError>>,
    ) -> Self {
        Self {
            script: Mutex::new(results.into_iter().collect()),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of requests this mock has received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// All requests received, in call order.
    pub fn calls(&self) -> Vec<ResolvedRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: &ResolvedRequest) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(request.clone());

        if let Some(result) = self.script.lock().unwrap().pop_front() {
            return result;
        }
        match &self.fallback {
            Some(result) => result.clone(),
            None => Err(TransportError::network("mock transport script exhausted")),
        }
    }
}
