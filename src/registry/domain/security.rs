//! Authentication requirements declared by agent versions.

use serde::{Deserialize, Serialize};

/// One authentication scheme a remote agent accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "lowercase")]
pub enum SecurityScheme {
    /// No authentication required.
    None,
    /// Static API key sent as a bearer token, or in a named header.
    #[serde(rename = "apikey", alias = "api_key")]
    ApiKey {
        /// Header carrying the key. Defaults to `Authorization: Bearer`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        header: Option<String>,
    },
    /// OAuth 2.0 bearer token.
    #[serde(alias = "oauth")]
    OAuth2,
}

impl SecurityScheme {
    /// Returns the scheme name used in capability cards.
    #[must_use]
    pub const fn card_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ApiKey { .. } => "apikey",
            Self::OAuth2 => "oauth2",
        }
    }
}

/// Ordered set of authentication schemes for one agent version.
///
/// An empty set means the remote agent accepts anonymous calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityRequirements(Vec<SecurityScheme>);

impl SecurityRequirements {
    /// Creates requirements from schemes, dropping duplicates while keeping
    /// declaration order.
    #[must_use]
    pub fn new(schemes: impl IntoIterator<Item = SecurityScheme>) -> Self {
        let mut unique: Vec<SecurityScheme> = Vec::new();
        for scheme in schemes {
            if !unique.contains(&scheme) {
                unique.push(scheme);
            }
        }
        Self(unique)
    }

    /// Returns requirements that accept anonymous calls.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self(Vec::new())
    }

    /// Returns the declared schemes in order.
    #[must_use]
    pub fn schemes(&self) -> &[SecurityScheme] {
        &self.0
    }

    /// Returns `true` when no credential is required.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0.is_empty() || self.0.contains(&SecurityScheme::None)
    }
}
