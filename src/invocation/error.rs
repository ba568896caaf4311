//! Invocation failures and their JSON-RPC mapping.

use super::{domain::RequestError, ports::RemoteFailure};
use crate::discovery::DiscoveryError;
use crate::jsonrpc::{ErrorKind, JsonRpcError};
use crate::registry::services::ResolveError;
use serde_json::json;
use thiserror::Error;

/// Usage hint attached to malformed invocation requests.
pub const AGENT_CALL_HINT: &str = "Send JSON text with keys: agent_id, input, optional version. \
     Example: {\"agent_id\": \"genie\", \"input\": \"List top 3 distribution centers.\"}";

/// Errors returned by the invocation gateway.
#[derive(Debug, Clone, Error)]
pub enum InvocationError {
    /// The embedded request could not be interpreted.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The target agent or version did not resolve.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Listing discoverable agents failed.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// The remote agent call failed.
    #[error(transparent)]
    Remote(#[from] RemoteFailure),
}

impl InvocationError {
    /// Returns the failure category reported to callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Request(_) => ErrorKind::MalformedRequest,
            Self::Resolve(err) if err.is_not_found() => ErrorKind::NotFound,
            Self::Resolve(_) => ErrorKind::Internal,
            Self::Discovery(err) => err.kind(),
            Self::Remote(RemoteFailure::Timeout { .. }) => ErrorKind::Timeout,
            Self::Remote(RemoteFailure::Unreachable { .. }) => ErrorKind::Unreachable,
            Self::Remote(RemoteFailure::Unauthorized { .. }) => ErrorKind::Unauthorized,
            Self::Remote(RemoteFailure::UpstreamError { .. }) => ErrorKind::Upstream,
        }
    }

    /// Converts the failure into a JSON-RPC error object.
    ///
    /// Malformed requests carry a usage `hint`; upstream errors carry the
    /// remote `status` and `body`.
    #[must_use]
    pub fn to_rpc_error(&self) -> JsonRpcError {
        let error = JsonRpcError::from_kind(self.kind(), self.to_string());
        match self {
            Self::Request(_) => error.with_data_entry("hint", json!(AGENT_CALL_HINT)),
            Self::Remote(RemoteFailure::UpstreamError { status, body, .. }) => error
                .with_data_entry("status", json!(status))
                .with_data_entry("body", body.clone()),
            Self::Resolve(_) | Self::Discovery(_) | Self::Remote(_) => error,
        }
    }
}
