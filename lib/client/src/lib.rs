//! Authenticated API request execution for the amber-relay integrations.
//!
//! This crate provides:
//!
//! - **Request specs**: logical method/target/body/query descriptions,
//!   resolved against stored credentials into exact outbound requests
//! - **Executor**: one network call per invocation, with an optional
//!   per-call-site rate-limit retry policy
//! - **Transport trait**: injected HTTP layer, with a reqwest-backed
//!   production implementation and a scripted mock for tests

pub mod credential;
pub mod error;
pub mod executor;
pub mod request;
pub mod retry;
pub mod transport;

pub use credential::ApiCredential;
pub use error::{ExecutorError, TransportError};
pub use executor::{Executor, SendReceipt};
pub use request::{Method, RequestOverrides, RequestSpec, RequestTarget, ResolvedRequest};
pub use retry::RetryPolicy;
pub use transport::{HttpTransport, MockTransport, ReqwestTransport, TransportResponse};
