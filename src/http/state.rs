//! Shared state handed to every HTTP handler.

use crate::config::GatewayConfig;
use crate::discovery::ResourceDirectory;
use crate::invocation::{
    ports::RemoteAgentClient,
    services::{GatewayCredentials, InvocationGateway},
};
use crate::registry::{ports::MetadataStore, services::RegistrationService};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;

/// Services behind the HTTP surfaces.
pub struct AppState<S, R, C>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    registration: RegistrationService<S, C>,
    gateway: InvocationGateway<S, R, C>,
    public_base_url: Option<String>,
}

impl<S, R, C> Clone for AppState<S, R, C>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            registration: self.registration.clone(),
            gateway: self.gateway.clone(),
            public_base_url: self.public_base_url.clone(),
        }
    }
}

impl<S, R, C> AppState<S, R, C>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    /// Wires the services over one store, remote client, and clock.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        client: Arc<R>,
        clock: Arc<C>,
        public_base_url: Option<String>,
    ) -> Self {
        let directory = ResourceDirectory::new(Arc::clone(&store), public_base_url.clone());
        Self {
            registration: RegistrationService::new(store, Arc::clone(&clock)),
            gateway: InvocationGateway::new(directory, client, clock),
            public_base_url,
        }
    }

    /// Wires the services using the base URL, timeout, and credentials from
    /// `config`.
    #[must_use]
    pub fn from_config(
        store: Arc<S>,
        client: Arc<R>,
        clock: Arc<C>,
        config: &GatewayConfig,
    ) -> Self {
        let mut credentials = GatewayCredentials::none();
        if let Some(key) = &config.api_key {
            credentials = credentials.with_api_key(key.as_str());
        }
        if let Some(token) = &config.oauth_token {
            credentials = credentials.with_oauth_token(token.as_str());
        }

        Self::new(store, client, clock, config.public_base_url.clone())
            .with_credentials(credentials)
            .with_timeout(config.invoke_timeout)
    }

    /// Sets the credentials offered to remote agents.
    #[must_use]
    pub fn with_credentials(mut self, credentials: GatewayCredentials) -> Self {
        self.gateway = self.gateway.with_credentials(credentials);
        self
    }

    /// Sets the default remote call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.gateway = self.gateway.with_timeout(timeout);
        self
    }

    /// Registry read and write service.
    #[must_use]
    pub const fn registration(&self) -> &RegistrationService<S, C> {
        &self.registration
    }

    /// Resource directory used by the discovery surface.
    #[must_use]
    pub const fn directory(&self) -> &ResourceDirectory<S> {
        self.gateway.directory()
    }

    /// Invocation gateway.
    #[must_use]
    pub const fn gateway(&self) -> &InvocationGateway<S, R, C> {
        &self.gateway
    }

    /// Builds an externally visible URL for a gateway `path`.
    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        self.public_base_url.as_deref().map_or_else(
            || path.to_owned(),
            |base| format!("{}{path}", base.trim_end_matches('/')),
        )
    }
}
