/// Request bodies for the relay endpoint.
/// The inbound shape is what the browser client sends (camelCase, key in the
/// body); the outbound shape is the Anthropic Messages API body (snake_case).
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::RelayError;

/// Model used when the client omits one.
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-20240307";
/// Token limit used when the client omits one.
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
/// Sampling temperature used when the client omits one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// The inbound request body. Everything except `apiKey` and `messages` is
/// optional and falls back to a fixed default when forwarded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChatRequest {
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    #[serde(default)]
    pub(crate) model: Option<String>,
    /// Kept as a raw JSON value so a non-array can be rejected explicitly
    /// rather than surfacing as a deserialization error.
    #[serde(default)]
    pub(crate) messages: Option<Value>,
    #[serde(default)]
    pub(crate) system: Option<String>,
    #[serde(default)]
    pub(crate) temperature: Option<f64>,
    #[serde(default)]
    pub(crate) max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Checks the request and converts it into the upstream body plus the
    /// caller's API key. Validation order matters: a missing key is reported
    /// before a missing messages array.
    pub(crate) fn validate(self) -> Result<(String, MessagesRequest), RelayError> {
        let api_key = match self.api_key {
            Some(key) if !key.is_empty() => key,
            _ => return Err(RelayError::MissingApiKey),
        };

        let messages = match self.messages {
            Some(messages @ Value::Array(_)) => messages,
            _ => return Err(RelayError::MessagesRequired),
        };

        Ok((
            api_key,
            MessagesRequest {
                model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                messages,
                system: self.system.unwrap_or_default(),
                max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
                temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            },
        ))
    }
}

/// The body forwarded to the Anthropic Messages API. Messages are passed
/// through as given; the remaining fields are always present, filled with
/// defaults where the client omitted them.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct MessagesRequest {
    pub(crate) model: String,
    pub(crate) messages: Value,
    pub(crate) system: String,
    pub(crate) max_tokens: u32,
    pub(crate) temperature: f64,
}
