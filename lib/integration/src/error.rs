//! Error types for the integration crate.
//!
//! - `ProviderError`: failures resolving host-supplied credentials or
//!   parameters
//! - `IntegrationError`: everything a concrete integration call can surface,
//!   wrapping provider and executor failures with the original diagnostics
//!   intact

use amber_relay_client::ExecutorError;
use std::fmt;

/// Errors from the host-facing provider seams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// No credential stored under the requested name.
    CredentialNotFound { name: String },
    /// A required parameter was not supplied for the item.
    MissingParameter { name: String, item_index: usize },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CredentialNotFound { name } => {
                write!(f, "no credential stored under '{name}'")
            }
            Self::MissingParameter { name, item_index } => {
                write!(f, "missing parameter '{name}' for item {item_index}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Errors surfaced by integration operations.
#[derive(Debug, Clone, PartialEq)]
pub enum IntegrationError {
    /// Provider lookup failed.
    Provider(ProviderError),
    /// The executor rejected or failed the request.
    Executor(ExecutorError),
    /// A user-supplied payload field could not be used.
    InvalidPayload { field: String, reason: String },
}

impl fmt::Display for IntegrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider(e) => write!(f, "provider error: {e}"),
            Self::Executor(e) => write!(f, "executor error: {e}"),
            Self::InvalidPayload { field, reason } => {
                write!(f, "invalid payload field '{field}': {reason}")
            }
        }
    }
}

impl std::error::Error for IntegrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Provider(e) => Some(e),
            Self::Executor(e) => Some(e),
            Self::InvalidPayload { .. } => None,
        }
    }
}

impl From<ProviderError> for IntegrationError {
    fn from(e: ProviderError) -> Self {
        Self::Provider(e)
    }
}

impl From<ExecutorError> for IntegrationError {
    fn from(e: ExecutorError) -> Self {
        Self::Executor(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display() {
        let err = ProviderError::CredentialNotFound {
            name: "PerfectMindApi".to_string(),
        };
        assert!(err.to_string().contains("PerfectMindApi"));
    }

    #[test]
    fn missing_parameter_names_item() {
        let err = ProviderError::MissingParameter {
            name: "webhookUri".to_string(),
            item_index: 3,
        };
        assert!(err.to_string().contains("webhookUri"));
        assert!(err.to_string().contains("item 3"));
    }

    #[test]
    fn integration_error_wraps_executor_error() {
        let inner = ExecutorError::RetryExhausted { attempts: 5 };
        let err = IntegrationError::from(inner.clone());
        assert_eq!(err, IntegrationError::Executor(inner));
        assert!(err.to_string().contains("max rate-limit retries"));
    }

    #[test]
    fn invalid_payload_display() {
        let err = IntegrationError::InvalidPayload {
            field: "embeds".to_string(),
            reason: "must be an array of embeds".to_string(),
        };
        assert!(err.to_string().contains("embeds"));
        assert!(err.to_string().contains("array"));
    }
}
