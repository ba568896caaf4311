//! Inbound A2A `message/send` parameters.

use super::RequestError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters of a `message/send` call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageParams {
    /// The user message carrying the embedded request.
    pub message: A2aMessage,
    /// Request-level metadata supplied by the caller.
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl SendMessageParams {
    /// Reads `message/send` parameters from a JSON-RPC `params` value.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::MissingMessage`] when `params` is absent or
    /// does not contain a message object with a `parts` array.
    pub fn from_params(params: Option<&Value>) -> Result<Self, RequestError> {
        let value = params.cloned().ok_or(RequestError::MissingMessage)?;
        serde_json::from_value(value).map_err(|_| RequestError::MissingMessage)
    }
}

/// One A2A message as sent by a client.
///
/// Parts are kept as raw JSON and interpreted leniently, since clients
/// disagree on whether the discriminator is `kind` or `type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct A2aMessage {
    /// Sender role, normally `user`.
    #[serde(default)]
    pub role: String,
    /// Raw message parts.
    pub parts: Vec<Value>,
    /// Client-assigned message identifier.
    #[serde(default)]
    pub message_id: Option<String>,
    /// Conversation context the message belongs to.
    #[serde(default)]
    pub context_id: Option<String>,
    /// Task the message continues, if any.
    #[serde(default)]
    pub task_id: Option<String>,
}

impl A2aMessage {
    /// Returns the recognised parts in order, skipping unknown kinds.
    pub fn parts(&self) -> impl Iterator<Item = MessagePart> + '_ {
        self.parts.iter().filter_map(MessagePart::from_value)
    }

    /// Extracts the embedded gateway request.
    ///
    /// The first text part is decoded as JSON. Without one, the first data
    /// part is used as-is.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::NoPayloadPart`] when neither part kind is
    /// present, [`RequestError::InvalidJson`] when the text does not parse,
    /// and [`RequestError::NotAnObject`] when the payload is not an object.
    pub fn embedded_payload(&self) -> Result<Value, RequestError> {
        let parts: Vec<MessagePart> = self.parts().collect();

        let text = parts.iter().find_map(|part| match part {
            MessagePart::Text { text } => Some(text.as_str()),
            MessagePart::Data { .. } => None,
        });

        let payload = text.map_or_else(
            || {
                parts
                    .iter()
                    .find_map(|part| match part {
                        MessagePart::Data { data } => Some(data.clone()),
                        MessagePart::Text { .. } => None,
                    })
                    .ok_or(RequestError::NoPayloadPart)
            },
            |raw| {
                serde_json::from_str::<Value>(raw.trim())
                    .map_err(|err| RequestError::InvalidJson(err.to_string()))
            },
        )?;

        if payload.is_object() {
            Ok(payload)
        } else {
            Err(RequestError::NotAnObject)
        }
    }
}

/// A message or artifact part the gateway understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MessagePart {
    /// Plain text.
    Text {
        /// Text content.
        text: String,
    },
    /// Structured JSON content.
    Data {
        /// Data content.
        data: Value,
    },
}

impl MessagePart {
    /// Creates a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Interprets a raw part, accepting either `kind` or `type` as the
    /// discriminator and inferring it from the fields when both are absent.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let declared = value
            .get("kind")
            .or_else(|| value.get("type"))
            .and_then(Value::as_str);

        let text = || {
            value
                .get("text")
                .and_then(Value::as_str)
                .map(|text| Self::Text {
                    text: text.to_owned(),
                })
        };
        let data = || value.get("data").cloned().map(|data| Self::Data { data });

        match declared {
            Some("text") => text(),
            Some("data") => data(),
            Some(_) => None,
            None => text().or_else(data),
        }
    }
}
