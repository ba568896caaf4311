//! Errors raised by the discovery surface.

use super::card::CardValidationError;
use crate::jsonrpc::ErrorKind;
use crate::registry::{
    domain::{AgentId, Protocol, VersionTag},
    ports::MetadataStoreError,
    services::ResolveError,
};
use thiserror::Error;

/// Discovery failures, each mapping onto one [`ErrorKind`].
#[derive(Debug, Clone, Error)]
pub enum DiscoveryError {
    /// The resource URI or agent identifier could not be interpreted.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The agent or version did not resolve.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The version has no card for the requested protocol.
    #[error("agent '{agent_id}' version '{version}' does not support {protocol}")]
    UnsupportedProtocol {
        /// Agent identifier.
        agent_id: AgentId,
        /// Version tag.
        version: VersionTag,
        /// Requested protocol.
        protocol: Protocol,
    },

    /// The card document violates the card schema.
    #[error(transparent)]
    InvalidCard(#[from] CardValidationError),

    /// The metadata store failed.
    #[error(transparent)]
    Store(#[from] MetadataStoreError),
}

impl DiscoveryError {
    /// Returns the failure category reported to callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedRequest(_) => ErrorKind::MalformedRequest,
            Self::Resolve(err) if err.is_not_found() => ErrorKind::NotFound,
            Self::UnsupportedProtocol { .. } => ErrorKind::NotFound,
            Self::InvalidCard(_) => ErrorKind::Validation,
            Self::Resolve(_) | Self::Store(_) => ErrorKind::Internal,
        }
    }
}
