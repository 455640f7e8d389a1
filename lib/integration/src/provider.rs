//! Host-facing provider seams.
//!
//! The workflow host owns credential storage and per-item parameter values;
//! integrations consume them through these two narrow traits so every call
//! path can be exercised without a host runtime present. The in-memory
//! implementations below are the test doubles used throughout this
//! workspace.

use crate::error::ProviderError;
use amber_relay_client::ApiCredential;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Read access to the host's credential store.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns the credential stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::CredentialNotFound` when nothing is stored
    /// under that name.
    async fn credential(&self, name: &str) -> Result<ApiCredential, ProviderError>;
}

/// Read access to the parameter values supplied for the current invocation.
///
/// Parameters are per item: a batch of input items may carry different
/// values under the same parameter name. The executor never reads
/// parameters itself; callers use them to build request specs.
pub trait ParameterProvider: Send + Sync {
    /// Returns the value supplied for `name` on the given item, if any.
    fn parameter(&self, name: &str, item_index: usize) -> Option<JsonValue>;

    /// Returns the supplied value or the given default.
    fn parameter_or(&self, name: &str, item_index: usize, default: JsonValue) -> JsonValue {
        self.parameter(name, item_index).unwrap_or(default)
    }

    /// Returns the supplied value or fails.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::MissingParameter` when no value was supplied.
    fn require(&self, name: &str, item_index: usize) -> Result<JsonValue, ProviderError> {
        self.parameter(name, item_index)
            .ok_or_else(|| ProviderError::MissingParameter {
                name: name.to_string(),
                item_index,
            })
    }
}

/// In-memory credential store keyed by credential name.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    credentials: HashMap<String, ApiCredential>,
}

impl StaticCredentials {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a credential under the given name.
    #[must_use]
    pub fn with_credential(mut self, name: impl Into<String>, credential: ApiCredential) -> Self {
        self.credentials.insert(name.into(), credential);
        self
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn credential(&self, name: &str) -> Result<ApiCredential, ProviderError> {
        self.credentials
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::CredentialNotFound {
                name: name.to_string(),
            })
    }
}

/// In-memory parameter source: one map of values per input item.
#[derive(Debug, Clone, Default)]
pub struct StaticParameters {
    items: Vec<HashMap<String, JsonValue>>,
}

impl StaticParameters {
    /// Creates a source with no items.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item with the given parameter values.
    #[must_use]
    pub fn with_item<K>(mut self, values: impl IntoIterator<Item = (K, JsonValue)>) -> Self
    where
        K: Into<String>,
    {
        self.items.push(
            values
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        );
        self
    }

    /// Number of input items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

impl ParameterProvider for StaticParameters {
    fn parameter(&self, name: &str, item_index: usize) -> Option<JsonValue> {
        self.items.get(item_index)?.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credential() -> ApiCredential {
        ApiCredential::new("key-123", "2.0", "42", "acme")
    }

    #[tokio::test]
    async fn static_credentials_return_stored_value() {
        let provider = StaticCredentials::new().with_credential("PerfectMindApi", credential());

        let found = provider.credential("PerfectMindApi").await.unwrap();
        assert_eq!(found, credential());
    }

    #[tokio::test]
    async fn unknown_credential_name_fails() {
        let provider = StaticCredentials::new();

        let err = provider.credential("PerfectMindApi").await.unwrap_err();
        assert_eq!(
            err,
            ProviderError::CredentialNotFound {
                name: "PerfectMindApi".to_string(),
            }
        );
    }

    #[test]
    fn parameters_are_per_item() {
        let provider = StaticParameters::new()
            .with_item([("text", json!("first"))])
            .with_item([("text", json!("second"))]);

        assert_eq!(provider.parameter("text", 0), Some(json!("first")));
        assert_eq!(provider.parameter("text", 1), Some(json!("second")));
        assert_eq!(provider.parameter("text", 2), None);
    }

    #[test]
    fn parameter_or_falls_back_to_default() {
        let provider = StaticParameters::new().with_item([("text", json!("hi"))]);

        assert_eq!(
            provider.parameter_or("missing", 0, json!({})),
            json!({})
        );
    }

    #[test]
    fn require_reports_missing_parameter() {
        let provider = StaticParameters::new().with_item([("text", json!("hi"))]);

        let err = provider.require("webhookUri", 0).unwrap_err();
        assert_eq!(
            err,
            ProviderError::MissingParameter {
                name: "webhookUri".to_string(),
                item_index: 0,
            }
        );
    }
}
