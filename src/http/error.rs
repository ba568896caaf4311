//! REST error responses.

use crate::discovery::DiscoveryError;
use crate::invocation::InvocationError;
use crate::jsonrpc::ErrorKind;
use crate::registry::{
    ports::MetadataStoreError,
    services::RegistrationError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// Failure returned by the registry read surface as `{"detail": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    kind: ErrorKind,
    detail: String,
}

impl ApiError {
    /// Creates an error of `kind`.
    #[must_use]
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, detail)
    }

    /// Creates a malformed-request error.
    #[must_use]
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedRequest, detail)
    }

    /// Returns the failure category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the HTTP status for the failure category.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::MalformedRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::Unreachable | ErrorKind::Unauthorized | ErrorKind::Upstream => {
                StatusCode::BAD_GATEWAY
            }
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.kind == ErrorKind::Internal {
            error!(detail = %self.detail, "request failed");
        }
        let status = self.status();
        let body = json!({ "detail": self.detail, "kind": self.kind.as_str() });
        (status, Json(body)).into_response()
    }
}

impl From<MetadataStoreError> for ApiError {
    fn from(err: MetadataStoreError) -> Self {
        let kind = match &err {
            MetadataStoreError::AgentNotFound(_) | MetadataStoreError::VersionNotFound { .. } => {
                ErrorKind::NotFound
            }
            MetadataStoreError::DuplicateAgent(_)
            | MetadataStoreError::DuplicateVersion { .. }
            | MetadataStoreError::ConcurrentModification { .. }
            | MetadataStoreError::InvalidPersistedData(_)
            | MetadataStoreError::Persistence(_) => ErrorKind::Internal,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Domain(domain) => Self::malformed(domain.to_string()),
            RegistrationError::Store(store) => store.into(),
            RegistrationError::InvalidCard(card) => {
                Self::new(ErrorKind::Validation, card.to_string())
            }
        }
    }
}

impl From<DiscoveryError> for ApiError {
    fn from(err: DiscoveryError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<InvocationError> for ApiError {
    fn from(err: InvocationError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}
