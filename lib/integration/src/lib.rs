//! Host-facing seams and concrete integrations for amber-relay.
//!
//! This crate provides:
//!
//! - **Provider traits**: narrow interfaces to the host's credential store
//!   and per-item parameter values, mockable without a host runtime
//! - **Discord webhook**: present-fields-only payload building and delivery
//!   with rate-limit retries
//! - **PerfectMind client**: authenticated scheduling API calls with no
//!   retry — the first error propagates

pub mod discord;
pub mod error;
pub mod perfectmind;
pub mod provider;

pub use discord::{WebhookItem, WebhookMessage, send_webhook};
pub use error::{IntegrationError, ProviderError};
pub use perfectmind::{AppointmentQuery, PerfectMindClient};
pub use provider::{CredentialProvider, ParameterProvider, StaticCredentials, StaticParameters};
