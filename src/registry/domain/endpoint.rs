//! Endpoint URLs for remote agent services.

use super::RegistryDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute `http(s)` URL or a `/`-rooted path relative to the public base.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EndpointUrl(String);

impl EndpointUrl {
    /// Creates a validated endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::EmptyEndpointUrl`] for blank input and
    /// [`RegistryDomainError::InvalidEndpointUrl`] when the value is neither
    /// absolute `http(s)` nor rooted at `/`.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistryDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(RegistryDomainError::EmptyEndpointUrl);
        }

        let lower = trimmed.to_ascii_lowercase();
        let is_absolute = ["http://", "https://"]
            .iter()
            .any(|scheme| lower.len() > scheme.len() && lower.starts_with(scheme));
        let is_relative = trimmed.starts_with('/') && !trimmed.starts_with("//");

        if !is_absolute && !is_relative {
            return Err(RegistryDomainError::InvalidEndpointUrl(raw));
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(RegistryDomainError::InvalidEndpointUrl(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when the URL must be joined with a base before use.
    #[must_use]
    pub fn is_relative(&self) -> bool {
        self.0.starts_with('/')
    }

    /// Resolves the URL against an optional public base.
    ///
    /// Absolute URLs are returned unchanged. Relative URLs are joined onto
    /// `base` with exactly one separating slash, or yield `None` when no base
    /// is configured.
    #[must_use]
    pub fn resolve(&self, base: Option<&str>) -> Option<String> {
        if !self.is_relative() {
            return Some(self.0.clone());
        }
        base.map(|root| format!("{}{}", root.trim_end_matches('/'), self.0))
    }
}

impl AsRef<str> for EndpointUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EndpointUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EndpointUrl {
    type Error = RegistryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EndpointUrl> for String {
    fn from(value: EndpointUrl) -> Self {
        value.0
    }
}
