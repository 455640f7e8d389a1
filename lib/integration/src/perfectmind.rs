//! PerfectMind scheduling API integration.
//!
//! A thin client over the executor: every call resolves against the stored
//! `PerfectMindApi` credential and goes out exactly once. This path carries
//! no retry policy — the first error propagates unconditionally, rate-limit
//! responses included.

use crate::error::IntegrationError;
use crate::provider::{CredentialProvider, ParameterProvider};
use amber_relay_client::{ApiCredential, Executor, HttpTransport, Method, RequestSpec};
use serde_json::{Value as JsonValue, json};
use tracing::debug;

/// Name the host stores the scheduling API credential under.
pub const CREDENTIAL_NAME: &str = "PerfectMindApi";

/// Client for the scheduling API.
#[derive(Debug)]
pub struct PerfectMindClient<T: HttpTransport> {
    executor: Executor<T>,
    credential: ApiCredential,
}

impl<T: HttpTransport> PerfectMindClient<T> {
    /// Creates a client over the given transport and credential.
    pub fn new(transport: T, credential: ApiCredential) -> Self {
        Self {
            executor: Executor::new(transport),
            credential,
        }
    }

    /// Creates a client using the credential stored under
    /// [`CREDENTIAL_NAME`].
    ///
    /// # Errors
    ///
    /// Propagates `CredentialNotFound` when the host has no such credential.
    pub async fn from_provider(
        transport: T,
        provider: &dyn CredentialProvider,
    ) -> Result<Self, IntegrationError> {
        let credential = provider.credential(CREDENTIAL_NAME).await?;
        Ok(Self::new(transport, credential))
    }

    /// The credential this client resolves requests against.
    #[must_use]
    pub fn credential(&self) -> &ApiCredential {
        &self.credential
    }

    /// Sends one request against the API and returns the decoded body.
    ///
    /// # Errors
    ///
    /// Surfaces executor errors unchanged — configuration failures before
    /// any network call, API failures with original status and body.
    pub async fn request(&self, spec: RequestSpec) -> Result<JsonValue, IntegrationError> {
        Ok(self.executor.send(&spec, Some(&self.credential)).await?)
    }

    /// Lists appointments for the credential's organization.
    ///
    /// # Errors
    ///
    /// Surfaces executor errors unchanged.
    pub async fn list_appointments(
        &self,
        query: &AppointmentQuery,
    ) -> Result<JsonValue, IntegrationError> {
        let resource = format!(
            "/Organizations/{}/Appointments",
            self.credential.client_number
        );

        let mut spec = RequestSpec::api(Method::Get, resource)
            .with_query_param("startTime", json!(query.start_time))
            .with_query_param("endTime", json!(query.end_time));
        if let Some(page) = query.page {
            spec = spec.with_query_param("page", json!(page));
        }
        if let Some(page_size) = query.page_size {
            spec = spec.with_query_param("pageSize", json!(page_size));
        }

        let response = self.request(spec).await?;
        debug!(paginated = query.pagination_data, "appointments listed");

        if query.pagination_data {
            Ok(response)
        } else {
            // Strip the pagination envelope and hand back the rows.
            Ok(response.get("Result").cloned().unwrap_or(JsonValue::Null))
        }
    }
}

/// Query for the appointment listing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentQuery {
    /// Window start (API-formatted timestamp string).
    pub start_time: String,
    /// Window end (API-formatted timestamp string).
    pub end_time: String,
    /// Page number, when paging explicitly.
    pub page: Option<u64>,
    /// Page size, when paging explicitly.
    pub page_size: Option<u64>,
    /// Keep the pagination envelope (`Result` + counts) in the response.
    /// When false, only the `Result` rows are returned.
    pub pagination_data: bool,
}

impl AppointmentQuery {
    /// Creates a query for the given time window, keeping the pagination
    /// envelope.
    #[must_use]
    pub fn new(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
            page: None,
            page_size: None,
            pagination_data: true,
        }
    }

    /// Requests a specific page.
    #[must_use]
    pub fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    /// Requests a specific page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Strips the pagination envelope from the response.
    #[must_use]
    pub fn without_pagination_data(mut self) -> Self {
        self.pagination_data = false;
        self
    }

    /// Builds a query from the host-supplied parameters for one input item:
    /// `startTime` and `endTime` at the top level, paging knobs under an
    /// `additionalFields` collection.
    ///
    /// # Errors
    ///
    /// Fails when a required time bound is missing.
    pub fn from_parameters(
        params: &dyn ParameterProvider,
        item_index: usize,
    ) -> Result<Self, IntegrationError> {
        let start_time = require_string(params, "startTime", item_index)?;
        let end_time = require_string(params, "endTime", item_index)?;

        let additional = params.parameter_or("additionalFields", item_index, json!({}));
        let mut query = Self::new(start_time, end_time);
        if let Some(page) = additional.get("page").and_then(JsonValue::as_u64) {
            query = query.with_page(page);
        }
        if let Some(page_size) = additional.get("pageSize").and_then(JsonValue::as_u64) {
            query = query.with_page_size(page_size);
        }
        if additional.get("paginationData").and_then(JsonValue::as_bool) == Some(false) {
            query = query.without_pagination_data();
        }
        Ok(query)
    }
}

fn require_string(
    params: &dyn ParameterProvider,
    name: &str,
    item_index: usize,
) -> Result<String, IntegrationError> {
    let value = params.require(name, item_index)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| IntegrationError::InvalidPayload {
            field: name.to_string(),
            reason: "must be a string".to_string(),
        })
}
