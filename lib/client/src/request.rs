//! Request specification and resolution.
//!
//! A [`RequestSpec`] is the logical description of one outbound call: method,
//! target, body, query, and header adjustments. [`RequestSpec::resolve`]
//! materializes it against a credential into a [`ResolvedRequest`] — the
//! exact method/URI/headers/body/query handed to the transport.
//!
//! Absent body and query are structurally absent (`None`), never sent as
//! empty placeholders: the downstream APIs treat presence as significant.

use crate::credential::ApiCredential;
use crate::error::ExecutorError;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::fmt;

/// HTTP methods supported by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Returns the method as its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a request is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTarget {
    /// A resource path under the credential-derived base URL.
    /// Requires a valid credential at resolve time.
    Api { resource: String },
    /// A caller-supplied absolute URI (e.g. a webhook URL). The credential
    /// is not consulted.
    Absolute { url: String },
}

impl fmt::Display for RequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api { resource } => f.write_str(resource),
            Self::Absolute { url } => f.write_str(url),
        }
    }
}

/// Whole-field replacements applied after normal resolution.
///
/// Overrides exist so a call site can force transport-specific options (such
/// as a multipart content type) without the executor knowing about every
/// transport quirk. The merge is shallow: a supplied field replaces the
/// assembled one wholesale, so overrides always win on collision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOverrides {
    /// Replaces the resolved method.
    pub method: Option<Method>,
    /// Replaces the resolved URI.
    pub uri: Option<String>,
    /// Replaces the entire resolved header map.
    pub headers: Option<HashMap<String, String>>,
    /// Replaces the resolved body.
    pub body: Option<JsonValue>,
}

impl RequestOverrides {
    /// Creates an empty override set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the resolved header map with exactly these headers.
    #[must_use]
    pub fn with_headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers = Some(
            headers
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Replaces the resolved body.
    #[must_use]
    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns true if no override is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.method.is_none()
            && self.uri.is_none()
            && self.headers.is_none()
            && self.body.is_none()
    }
}

/// Logical description of one outbound request.
///
/// Immutable after construction; build it with the chained `with_*` methods.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    method: Method,
    target: RequestTarget,
    body: Map<String, JsonValue>,
    query: Map<String, JsonValue>,
    extra_headers: HashMap<String, String>,
    overrides: RequestOverrides,
}

impl RequestSpec {
    /// Creates a spec addressed at a resource under the API base URL.
    #[must_use]
    pub fn api(method: Method, resource: impl Into<String>) -> Self {
        Self::new(
            method,
            RequestTarget::Api {
                resource: resource.into(),
            },
        )
    }

    /// Creates a spec addressed at an absolute URI.
    #[must_use]
    pub fn absolute(method: Method, url: impl Into<String>) -> Self {
        Self::new(method, RequestTarget::Absolute { url: url.into() })
    }

    fn new(method: Method, target: RequestTarget) -> Self {
        Self {
            method,
            target,
            body: Map::new(),
            query: Map::new(),
            extra_headers: HashMap::new(),
            overrides: RequestOverrides::default(),
        }
    }

    /// Adds a body field.
    #[must_use]
    pub fn with_body_field(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.body.insert(key.into(), value);
        self
    }

    /// Sets the entire body mapping at once.
    #[must_use]
    pub fn with_body(mut self, body: Map<String, JsonValue>) -> Self {
        self.body = body;
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query_param(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.query.insert(key.into(), value);
        self
    }

    /// Adds a header merged over the base headers (this one wins on
    /// collision).
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    /// Attaches overrides applied last, after all other resolution.
    #[must_use]
    pub fn with_overrides(mut self, overrides: RequestOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// The request method (before overrides).
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// The request target.
    #[must_use]
    pub fn target(&self) -> &RequestTarget {
        &self.target
    }

    /// Materializes this spec against a credential.
    ///
    /// Resolution order:
    /// 1. base headers (JSON content type/accept, plus credential auth
    ///    headers for `Api` targets),
    /// 2. `extra_headers` merged over base (extra wins),
    /// 3. body/query included only when non-empty,
    /// 4. overrides applied last, replacing whole fields.
    ///
    /// # Errors
    ///
    /// Returns `ExecutorError::Configuration` when an `Api` target has no
    /// credential or the credential has empty required fields. No network
    /// activity happens here.
    pub fn resolve(
        &self,
        credential: Option<&ApiCredential>,
    ) -> Result<ResolvedRequest, ExecutorError> {
        let mut headers: HashMap<String, String> = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "application/json".to_string());

        let uri = match &self.target {
            RequestTarget::Api { resource } => {
                let credential = credential.ok_or_else(|| ExecutorError::Configuration {
                    reason: "no credential available for API request".to_string(),
                })?;
                credential.validate()?;
                for (name, value) in credential.auth_headers() {
                    headers.insert(name.to_string(), value);
                }
                format!("{}{}", credential.base_url(), resource)
            }
            RequestTarget::Absolute { url } => url.clone(),
        };

        for (name, value) in &self.extra_headers {
            headers.insert(name.clone(), value.clone());
        }

        let body = if self.body.is_empty() {
            None
        } else {
            Some(JsonValue::Object(self.body.clone()))
        };

        let query = if self.query.is_empty() {
            None
        } else {
            Some(
                self.query
                    .iter()
                    .map(|(k, v)| (k.clone(), query_value(v)))
                    .collect(),
            )
        };

        let mut resolved = ResolvedRequest {
            method: self.method,
            uri,
            headers,
            body,
            query,
        };

        if let Some(method) = self.overrides.method {
            resolved.method = method;
        }
        if let Some(uri) = &self.overrides.uri {
            resolved.uri = uri.clone();
        }
        if let Some(headers) = &self.overrides.headers {
            resolved.headers = headers.clone();
        }
        if let Some(body) = &self.overrides.body {
            resolved.body = Some(body.clone());
        }

        Ok(resolved)
    }
}

/// Renders a JSON value as a query-string value.
fn query_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The fully-materialized outbound request handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HashMap<String, String>,
    /// `None` when the spec supplied no body — never an empty object.
    pub body: Option<JsonValue>,
    /// `None` when the spec supplied no query parameters.
    pub query: Option<Vec<(String, String)>>,
}
