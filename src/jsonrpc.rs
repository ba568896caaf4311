//! JSON-RPC 2.0 envelopes shared by the discovery and invocation surfaces.
//!
//! Both surfaces read raw request bodies and frame their own responses so
//! that malformed input can be reported with the correct error code and the
//! caller's request id.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Protocol version string carried by every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Invalid JSON was received.
pub const PARSE_ERROR: i64 = -32700;
/// The JSON sent is not a valid request object.
pub const INVALID_REQUEST: i64 = -32600;
/// The method does not exist.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Invalid method parameters.
pub const INVALID_PARAMS: i64 = -32602;
/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i64 = -32603;

/// Incoming JSON-RPC request or notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version; always `"2.0"` after parsing.
    pub jsonrpc: String,
    /// Caller-chosen request id. Absent for notifications; an explicit
    /// `null` is kept as `Some(Value::Null)`.
    #[serde(
        default,
        deserialize_with = "present_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Value>,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcRequest {
    /// Returns `true` when the caller expects no response.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Returns the id to echo, using `null` for notifications.
    #[must_use]
    pub fn response_id(&self) -> Value {
        self.id.clone().unwrap_or(Value::Null)
    }

    /// Parses a raw request body.
    ///
    /// # Errors
    ///
    /// Returns a ready-to-send error response: [`PARSE_ERROR`] for invalid
    /// JSON and [`INVALID_REQUEST`] for anything that is not a JSON-RPC 2.0
    /// request object.
    pub fn parse(body: &[u8]) -> Result<Self, Box<JsonRpcResponse>> {
        let value: Value = serde_json::from_slice(body).map_err(|err| {
            Box::new(JsonRpcResponse::failure(
                Value::Null,
                JsonRpcError::new(PARSE_ERROR, "Parse error").with_data(json!({
                    "detail": err.to_string(),
                })),
            ))
        })?;

        let id = value.get("id").cloned();
        let invalid = |detail: &str| {
            Box::new(JsonRpcResponse::failure(
                id.clone().unwrap_or(Value::Null),
                JsonRpcError::new(INVALID_REQUEST, "Invalid Request").with_data(json!({
                    "detail": detail,
                })),
            ))
        };

        if !value.is_object() {
            return Err(invalid("request must be a JSON object"));
        }
        if value.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
            return Err(invalid("jsonrpc must be \"2.0\""));
        }
        if !value.get("method").is_some_and(Value::is_string) {
            return Err(invalid("method must be a string"));
        }

        serde_json::from_value(value).map_err(|err| invalid(&err.to_string()))
    }
}

/// Outgoing JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version.
    pub jsonrpc: String,
    /// Echoed request id, or `null` when it could not be read.
    pub id: Value,
    /// Successful result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Builds a success response.
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Builds an error response.
    #[must_use]
    pub fn failure(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Builds the standard method-not-found response.
    #[must_use]
    pub fn method_not_found(id: Value, method: &str) -> Self {
        Self::failure(
            id,
            JsonRpcError::new(METHOD_NOT_FOUND, "Method not found")
                .with_data(json!({ "method": method })),
        )
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Numeric error code.
    pub code: i64,
    /// Short description.
    pub message: String,
    /// Structured detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Creates an error without data.
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attaches structured data.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Adds one field to an object-valued `data`, creating it when absent.
    #[must_use]
    pub fn with_data_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        let mut entries = match self.data.take() {
            Some(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        entries.insert(key.into(), value);
        self.data = Some(Value::Object(entries));
        self
    }

    /// Creates an error for a gateway failure kind.
    ///
    /// `data` carries `{"kind": ..., "detail": ...}`.
    #[must_use]
    pub fn from_kind(kind: ErrorKind, raw_detail: impl Into<String>) -> Self {
        let detail = raw_detail.into();
        Self::new(kind.code(), detail.clone()).with_data(json!({
            "kind": kind.as_str(),
            "detail": detail,
        }))
    }
}

/// Failure categories surfaced by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The agent, version, or resource does not exist or is disabled.
    NotFound,
    /// The request could not be interpreted.
    MalformedRequest,
    /// A card document failed schema validation.
    Validation,
    /// The downstream agent did not answer in time.
    Timeout,
    /// The downstream agent could not be reached.
    Unreachable,
    /// The downstream agent rejected the gateway's credentials.
    Unauthorized,
    /// The downstream agent answered with an error status.
    Upstream,
    /// The gateway itself failed.
    Internal,
}

impl ErrorKind {
    /// Returns the kind name reported in error `data`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NotFoundError",
            Self::MalformedRequest => "MalformedRequestError",
            Self::Validation => "ValidationError",
            Self::Timeout => "Timeout",
            Self::Unreachable => "Unreachable",
            Self::Unauthorized => "Unauthorized",
            Self::Upstream => "UpstreamError",
            Self::Internal => "InternalError",
        }
    }

    /// Returns the JSON-RPC error code for the kind.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::NotFound => -32004,
            Self::MalformedRequest => INVALID_PARAMS,
            Self::Validation => -32014,
            Self::Timeout => -32010,
            Self::Unreachable => -32011,
            Self::Unauthorized => -32012,
            Self::Upstream => -32013,
            Self::Internal => INTERNAL_ERROR,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
