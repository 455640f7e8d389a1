//! Discord webhook integration.
//!
//! Builds a webhook message payload from user-supplied parameters and sends
//! it through the executor's rate-limit retry path. The payload carries only
//! the fields that were actually provided — Discord treats field presence as
//! significant, so absent fields are absent, never `null` or empty.

use crate::error::IntegrationError;
use crate::provider::ParameterProvider;
use amber_relay_client::{
    Executor, HttpTransport, Method, RequestOverrides, RequestSpec, RetryPolicy, SendReceipt,
};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

/// Content type for regular webhook sends.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Content type forced when a raw `payload_json` is attached.
pub const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data; charset=utf-8";

/// A webhook message payload.
///
/// Field names match Discord's webhook API. Every field is optional;
/// [`WebhookMessage::validate`] enforces Discord's requirement that at least
/// content or embeds is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WebhookMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeds: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_json: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<JsonValue>,
}

impl WebhookMessage {
    /// Creates an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the sender username shown in the channel.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the avatar URL shown in the channel.
    #[must_use]
    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }

    /// Marks the message as text-to-speech.
    #[must_use]
    pub fn with_tts(mut self, tts: bool) -> Self {
        self.tts = Some(tts);
        self
    }

    /// Sets the message flags bitfield.
    #[must_use]
    pub fn with_flags(mut self, flags: i64) -> Self {
        self.flags = Some(flags);
        self
    }

    /// Attaches embeds (must be a JSON array).
    #[must_use]
    pub fn with_embeds(mut self, embeds: JsonValue) -> Self {
        self.embeds = Some(embeds);
        self
    }

    /// Sets the allowed-mentions object.
    #[must_use]
    pub fn with_allowed_mentions(mut self, allowed_mentions: JsonValue) -> Self {
        self.allowed_mentions = Some(allowed_mentions);
        self
    }

    /// Attaches message components.
    #[must_use]
    pub fn with_components(mut self, components: JsonValue) -> Self {
        self.components = Some(components);
        self
    }

    /// Attaches a raw payload; forces the multipart content type on send.
    #[must_use]
    pub fn with_payload_json(mut self, payload_json: JsonValue) -> Self {
        self.payload_json = Some(payload_json);
        self
    }

    /// Attaches attachment metadata.
    #[must_use]
    pub fn with_attachments(mut self, attachments: JsonValue) -> Self {
        self.attachments = Some(attachments);
        self
    }

    /// Checks the message against Discord's payload rules.
    ///
    /// # Errors
    ///
    /// Fails when neither content nor embeds is set, or when embeds is not
    /// an array.
    pub fn validate(&self) -> Result<(), IntegrationError> {
        let has_content = self.content.as_deref().is_some_and(|c| !c.is_empty());
        if !has_content && self.embeds.is_none() {
            return Err(IntegrationError::InvalidPayload {
                field: "content".to_string(),
                reason: "either content or embeds must be set".to_string(),
            });
        }
        if let Some(embeds) = &self.embeds
            && !embeds.is_array()
        {
            return Err(IntegrationError::InvalidPayload {
                field: "embeds".to_string(),
                reason: "must be an array of embeds".to_string(),
            });
        }
        Ok(())
    }

    /// The outbound body mapping, populated only with present fields.
    #[must_use]
    pub fn to_body(&self) -> Map<String, JsonValue> {
        match serde_json::to_value(self) {
            Ok(JsonValue::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Builds a message and target URL from the host-supplied parameters
    /// for one input item.
    ///
    /// Mirrors the host's parameter layout: `webhookUri` and `text` at the
    /// top level, everything else under an `options` collection whose JSON
    /// fields arrive as strings. Unset and falsy option values are treated
    /// as not provided.
    ///
    /// # Errors
    ///
    /// Fails when the webhook URI is missing, a JSON option does not parse,
    /// or the finished message fails [`validate`](Self::validate).
    pub fn from_parameters(
        params: &dyn ParameterProvider,
        item_index: usize,
    ) -> Result<WebhookItem, IntegrationError> {
        let url = params
            .parameter("webhookUri", item_index)
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| IntegrationError::InvalidPayload {
                field: "webhookUri".to_string(),
                reason: "webhook URI is required".to_string(),
            })?;

        let mut message = Self::new();

        let text = params.parameter_or("text", item_index, JsonValue::Null);
        if let Some(content) = text.as_str().filter(|c| !c.is_empty()) {
            message = message.with_content(content);
        }

        let options = params.parameter_or("options", item_index, JsonValue::Object(Map::new()));

        if let Some(embeds) = option_value(&options, "embeds") {
            let embeds = parse_json_option("embeds", embeds)?;
            message = message.with_embeds(embeds);
        }
        if let Some(username) = option_value(&options, "username").and_then(JsonValue::as_str) {
            message = message.with_username(username);
        }
        if let Some(components) = option_value(&options, "components") {
            message = message.with_components(parse_json_option("components", components)?);
        }
        if let Some(mentions) = option_value(&options, "allowedMentions") {
            message = message.with_allowed_mentions(parse_json_option("allowedMentions", mentions)?);
        }
        if let Some(avatar_url) = option_value(&options, "avatarUrl").and_then(JsonValue::as_str) {
            message = message.with_avatar_url(avatar_url);
        }
        if let Some(flags) = option_value(&options, "flags").and_then(JsonValue::as_i64) {
            message = message.with_flags(flags);
        }
        if option_value(&options, "tts").and_then(JsonValue::as_bool) == Some(true) {
            message = message.with_tts(true);
        }
        if let Some(payload) = option_value(&options, "payloadJson") {
            message = message.with_payload_json(parse_json_option("payloadJson", payload)?);
        }
        if let Some(attachments) = option_value(&options, "attachments") {
            message = message.with_attachments(parse_json_option("attachments", attachments)?);
        }

        message.validate()?;
        Ok(WebhookItem { url, message })
    }
}

/// One item's webhook send: target URL plus the message to deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookItem {
    pub url: String,
    pub message: WebhookMessage,
}

/// Reads an option field, treating unset and falsy values as not provided.
fn option_value<'a>(options: &'a JsonValue, name: &str) -> Option<&'a JsonValue> {
    options.get(name).filter(|v| is_set(v))
}

/// The host UI hands JSON fields over as strings; an empty string, `false`,
/// or `0` all mean the user left the field untouched.
fn is_set(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

/// Parses a JSON option that may arrive as a string.
fn parse_json_option(field: &str, value: &JsonValue) -> Result<JsonValue, IntegrationError> {
    match value {
        JsonValue::String(raw) => {
            serde_json::from_str(raw).map_err(|_| IntegrationError::InvalidPayload {
                field: field.to_string(),
                reason: "must be valid JSON".to_string(),
            })
        }
        other => Ok(other.clone()),
    }
}

/// Sends a webhook message, retrying rate-limited attempts per the policy.
///
/// The message is delivered as JSON unless it carries a `payload_json`, in
/// which case the multipart content type is forced through request
/// overrides, exactly as Discord expects for raw payload uploads.
///
/// # Errors
///
/// Propagates validation failures, non-429 API errors with their original
/// status and body, and `RetryExhausted` when 429s persist past the budget.
pub async fn send_webhook<T: HttpTransport>(
    executor: &Executor<T>,
    url: &str,
    message: &WebhookMessage,
    policy: &RetryPolicy,
) -> Result<SendReceipt, IntegrationError> {
    message.validate()?;

    let mut spec = RequestSpec::absolute(Method::Post, url)
        .with_body(message.to_body())
        .with_header("Content-Type", JSON_CONTENT_TYPE);

    if message.payload_json.is_some() {
        spec = spec.with_overrides(
            RequestOverrides::new().with_headers([("Content-Type", MULTIPART_CONTENT_TYPE)]),
        );
    }

    let receipt = executor.send_with_retry(&spec, None, policy).await?;
    debug!(attempts = receipt.attempts, "webhook delivered");
    Ok(receipt)
}
