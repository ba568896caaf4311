//! Error types for registry domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing registry domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryDomainError {
    /// The agent identifier is empty after trimming.
    #[error("agent id must not be empty")]
    EmptyAgentId,

    /// The agent identifier contains characters outside `[a-z0-9_-]`.
    #[error(
        "agent id '{0}' contains invalid characters (only lowercase alphanumeric, hyphens, and underscores allowed)"
    )]
    InvalidAgentId(String),

    /// The agent identifier exceeds the 100-character storage limit.
    #[error("agent id exceeds 100 character limit: {0}")]
    AgentIdTooLong(String),

    /// The version tag is empty after trimming.
    #[error("version must not be empty")]
    EmptyVersionTag,

    /// The version tag contains whitespace, slashes, or other unsupported
    /// characters.
    #[error("version '{0}' contains invalid characters")]
    InvalidVersionTag(String),

    /// The version tag exceeds the 64-character storage limit.
    #[error("version exceeds 64 character limit: {0}")]
    VersionTagTooLong(String),

    /// The agent display name is empty after trimming.
    #[error("agent name must not be empty")]
    EmptyAgentName,

    /// The agent owner is empty after trimming.
    #[error("agent owner must not be empty")]
    EmptyOwner,

    /// An endpoint URL is empty after trimming.
    #[error("endpoint URL must not be empty")]
    EmptyEndpointUrl,

    /// An endpoint URL is neither absolute `http(s)://` nor a `/`-rooted path.
    #[error("endpoint URL '{0}' must start with 'http://', 'https://', or '/'")]
    InvalidEndpointUrl(String),

    /// A stored card document is not a JSON object.
    #[error("stored card for {agent_id}@{version} must be a JSON object")]
    CardNotAnObject {
        /// Owning agent identifier.
        agent_id: String,
        /// Owning version tag.
        version: String,
    },
}

/// Error returned while parsing agent status from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown agent status: {0}")]
pub struct ParseAgentStatusError(pub String);

/// Error returned while parsing a protocol identifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown protocol: {0}")]
pub struct ParseProtocolError(pub String);
