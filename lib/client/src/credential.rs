//! Stored API credentials.
//!
//! Credentials are owned and persisted by the host runtime; this crate only
//! reads them. Encryption at rest is the host's concern.

use crate::error::ExecutorError;
use serde::{Deserialize, Serialize};

/// Credentials for the scheduling API.
///
/// The subdomain and API version determine the base URL; the key and client
/// number are sent as fixed auth headers on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCredential {
    /// Access key sent as `X-Access-Key`.
    pub api_key: String,
    /// API version segment of the base URL (e.g. "2.0").
    pub api_version: String,
    /// Organization identifier sent as `X-Client-Number`.
    pub client_number: String,
    /// Tenant subdomain of the base URL.
    pub sub_domain: String,
}

impl ApiCredential {
    /// Creates a credential from its four required fields.
    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        api_version: impl Into<String>,
        client_number: impl Into<String>,
        sub_domain: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_version: api_version.into(),
            client_number: client_number.into(),
            sub_domain: sub_domain.into(),
        }
    }

    /// Checks that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns `ExecutorError::Configuration` naming the first empty field.
    pub fn validate(&self) -> Result<(), ExecutorError> {
        let fields = [
            ("apiKey", &self.api_key),
            ("apiVersion", &self.api_version),
            ("clientNumber", &self.client_number),
            ("subDomain", &self.sub_domain),
        ];
        for (name, value) in fields {
            if value.is_empty() {
                return Err(ExecutorError::Configuration {
                    reason: format!("credential field '{name}' is empty"),
                });
            }
        }
        Ok(())
    }

    /// The base URL derived from this credential.
    ///
    /// Resource paths are appended verbatim, so they must start with `/`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!(
            "https://{}.perfectmind.com/api/{}",
            self.sub_domain, self.api_version
        )
    }

    /// Fixed auth headers derived from this credential.
    #[must_use]
    pub fn auth_headers(&self) -> [(&'static str, String); 2] {
        [
            ("X-Access-Key", self.api_key.clone()),
            ("X-Client-Number", self.client_number.clone()),
        ]
    }
}
