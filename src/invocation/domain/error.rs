//! Errors raised while interpreting an invocation envelope.

use thiserror::Error;

/// Reasons an embedded gateway request could not be understood.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    /// `params.message` is missing or not a message object.
    #[error("params must contain a message with parts")]
    MissingMessage,

    /// The message carries no text or data part.
    #[error("message has no text or data part")]
    NoPayloadPart,

    /// The text part is not valid JSON.
    #[error("message text is not valid JSON: {0}")]
    InvalidJson(String),

    /// The embedded payload is valid JSON but not an object.
    #[error("embedded request must be a JSON object")]
    NotAnObject,

    /// The `action` field names an unsupported action.
    #[error("unsupported action '{0}'")]
    UnknownAction(String),

    /// `agent_id` is absent or blank.
    #[error("missing agent_id")]
    MissingAgentId,

    /// `agent_id` is present but not a valid identifier.
    #[error("invalid agent_id: {0}")]
    InvalidAgentId(String),

    /// `version` is neither a valid tag string nor a non-negative integer.
    #[error("invalid version: {0}")]
    InvalidVersion(String),

    /// `metadata` is present but not an object.
    #[error("metadata must be a JSON object")]
    InvalidMetadata,

    /// `input` is absent or empty.
    #[error("missing input")]
    MissingInput,

    /// A per-call timeout is not a positive number of seconds.
    #[error("timeout_seconds must be a positive number")]
    InvalidTimeout,
}
