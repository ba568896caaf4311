//! Remote agent client port.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Result type for remote agent calls.
pub type RemoteResult<T> = Result<T, RemoteFailure>;

/// Contract for calling a remote agent's serving endpoint.
///
/// Implementations perform exactly one request per call and never retry.
#[async_trait]
pub trait RemoteAgentClient: Send + Sync {
    /// Posts `call.payload()` to `call.serving_url()` and waits at most
    /// `call.timeout()` for the complete response.
    async fn invoke(&self, call: &RemoteCall) -> RemoteResult<RemoteResponse>;
}

/// One outbound call to a remote agent.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCall {
    serving_url: String,
    headers: Vec<(String, String)>,
    payload: Value,
    timeout: Duration,
}

impl RemoteCall {
    /// Creates a call without extra headers.
    #[must_use]
    pub fn new(serving_url: impl Into<String>, payload: Value, timeout: Duration) -> Self {
        Self {
            serving_url: serving_url.into(),
            headers: Vec::new(),
            payload,
            timeout,
        }
    }

    /// Adds a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Absolute URL the call is posted to.
    #[must_use]
    pub fn serving_url(&self) -> &str {
        &self.serving_url
    }

    /// Extra request headers, in insertion order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the value of the first header called `name`, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// JSON request body.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Upper bound on the whole exchange.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Successful answer from a remote agent.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, if present.
    pub content_type: Option<String>,
    /// Normalized response body.
    pub body: Value,
}

/// Ways a remote call can fail.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RemoteFailure {
    /// No complete answer arrived within the timeout.
    #[error("agent at {url} did not answer within {timeout_ms} ms")]
    Timeout {
        /// Target URL.
        url: String,
        /// Applied timeout in milliseconds.
        timeout_ms: u64,
    },

    /// The connection could not be established or was dropped.
    #[error("agent at {url} is unreachable: {reason}")]
    Unreachable {
        /// Target URL.
        url: String,
        /// Transport error description.
        reason: String,
    },

    /// The agent answered 401 or 403.
    #[error("agent at {url} rejected the gateway credentials (HTTP {status})")]
    Unauthorized {
        /// Target URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The agent answered with another non-success status.
    #[error("agent at {url} failed with HTTP {status}")]
    UpstreamError {
        /// Target URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Normalized response body.
        body: Value,
    },
}

impl RemoteFailure {
    /// Creates a timeout failure for `url`.
    #[must_use]
    pub fn timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            url: url.into(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Creates an unreachable failure for `url`.
    #[must_use]
    pub fn unreachable(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unreachable {
            url: url.into(),
            reason: reason.into(),
        }
    }
}
