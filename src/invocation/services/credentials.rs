//! Selection of outbound credentials from declared security schemes.

use crate::registry::domain::{SecurityRequirements, SecurityScheme};
use std::fmt;
use tracing::debug;

const AUTHORIZATION: &str = "Authorization";

/// Secrets the gateway can present to remote agents.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct GatewayCredentials {
    api_key: Option<String>,
    oauth_token: Option<String>,
}

impl GatewayCredentials {
    /// Creates an empty credential set.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            api_key: None,
            oauth_token: None,
        }
    }

    /// Sets the API key used for `apikey` schemes.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the bearer token used for `oauth2` schemes.
    #[must_use]
    pub fn with_oauth_token(mut self, token: impl Into<String>) -> Self {
        self.oauth_token = Some(token.into());
        self
    }

    /// Returns the headers satisfying the first scheme that can be met.
    ///
    /// A `none` scheme met before any satisfiable one sends nothing. When no
    /// scheme can be satisfied the call goes out without credentials and the
    /// remote agent decides.
    #[must_use]
    pub fn headers_for(&self, security: &SecurityRequirements) -> Vec<(String, String)> {
        for scheme in security.schemes() {
            let header = match scheme {
                SecurityScheme::None => return Vec::new(),
                SecurityScheme::ApiKey { header } => self.api_key.as_ref().map(|key| {
                    header.as_ref().map_or_else(
                        || (AUTHORIZATION.to_owned(), format!("Bearer {key}")),
                        |name| (name.clone(), key.clone()),
                    )
                }),
                SecurityScheme::OAuth2 => self
                    .oauth_token
                    .as_ref()
                    .map(|token| (AUTHORIZATION.to_owned(), format!("Bearer {token}"))),
            };
            if let Some(found) = header {
                return vec![found];
            }
        }

        if !security.is_anonymous() {
            debug!("no configured credential satisfies the declared security schemes");
        }
        Vec::new()
    }
}

impl fmt::Debug for GatewayCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayCredentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("oauth_token", &self.oauth_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
