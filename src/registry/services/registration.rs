//! Registry write operations: agents, versions, default pointers, and card
//! overrides.

use crate::discovery::card::{CardValidationError, validate_card};
use crate::registry::{
    domain::{
        Agent, AgentId, AgentProfile, AgentVersion, EndpointUrl, Protocol, RegistryDomainError,
        SecurityRequirements, StoredCard, VersionTag,
    },
    ports::{MetadataStore, MetadataStoreError},
};
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Attempts made for one agent write before a conflict is reported.
const MAX_WRITE_ATTEMPTS: usize = 3;

/// Request payload for registering a new agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterAgentRequest {
    agent_id: String,
    name: String,
    description: String,
    owner: String,
}

impl RegisterAgentRequest {
    /// Creates a request with the required agent fields.
    #[must_use]
    pub fn new(
        agent_id: impl Into<String>,
        name: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            name: name.into(),
            description: String::new(),
            owner: owner.into(),
        }
    }

    /// Sets the free-text description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Request payload for publishing a new agent version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishVersionRequest {
    agent_id: String,
    version: String,
    serving_url: String,
    model_ref: Option<String>,
    mcp_server_url: Option<String>,
    schema: Option<Value>,
    tags: Vec<String>,
    protocols: Vec<Protocol>,
    security: SecurityRequirements,
    make_default: bool,
}

impl PublishVersionRequest {
    /// Creates a request with the required version fields.
    #[must_use]
    pub fn new(
        agent_id: impl Into<String>,
        version: impl Into<String>,
        serving_url: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            version: version.into(),
            serving_url: serving_url.into(),
            model_ref: None,
            mcp_server_url: None,
            schema: None,
            tags: Vec::new(),
            protocols: Vec::new(),
            security: SecurityRequirements::anonymous(),
            make_default: false,
        }
    }

    /// Sets the opaque model reference.
    #[must_use]
    pub fn with_model_ref(mut self, model_ref: impl Into<String>) -> Self {
        self.model_ref = Some(model_ref.into());
        self
    }

    /// Sets the MCP server endpoint.
    #[must_use]
    pub fn with_mcp_server_url(mut self, url: impl Into<String>) -> Self {
        self.mcp_server_url = Some(url.into());
        self
    }

    /// Sets the input/output contract document.
    #[must_use]
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Sets the discovery tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the supported protocols.
    #[must_use]
    pub fn with_protocols(mut self, protocols: impl IntoIterator<Item = Protocol>) -> Self {
        self.protocols = protocols.into_iter().collect();
        self
    }

    /// Sets the authentication requirements.
    #[must_use]
    pub fn with_security(mut self, security: SecurityRequirements) -> Self {
        self.security = security;
        self
    }

    /// Points the agent's default at this version once published.
    #[must_use]
    pub const fn as_default(mut self) -> Self {
        self.make_default = true;
        self
    }
}

/// Service-level errors for registry write operations.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] RegistryDomainError),
    /// Metadata store operation failed.
    #[error(transparent)]
    Store(#[from] MetadataStoreError),
    /// A card override failed schema validation.
    #[error(transparent)]
    InvalidCard(#[from] CardValidationError),
}

/// Result type for registration service operations.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Registry write orchestration service.
pub struct RegistrationService<S, C>
where
    S: MetadataStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> Clone for RegistrationService<S, C>
where
    S: MetadataStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, C> RegistrationService<S, C>
where
    S: MetadataStore,
    C: Clock + Send + Sync,
{
    /// Creates a new registration service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Registers a new `Active` agent with no default version.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Domain`] for invalid fields and
    /// [`RegistrationError::Store`] when the identifier is taken or
    /// persistence fails.
    pub async fn register_agent(&self, request: RegisterAgentRequest) -> RegistrationResult<Agent> {
        let RegisterAgentRequest {
            agent_id,
            name,
            description,
            owner,
        } = request;

        let id = AgentId::new(agent_id)?;
        let profile = AgentProfile::new(name, description, owner)?;
        let agent = Agent::new(id, profile, &*self.clock);
        self.store.register_agent(&agent).await?;
        info!(agent_id = %agent.id(), "registered agent");
        Ok(agent)
    }

    /// Replaces an agent's name, description, and owner.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when validation fails, the agent is
    /// missing, or persistence fails.
    pub async fn update_profile(
        &self,
        agent_id: &str,
        name: &str,
        description: &str,
        owner: &str,
    ) -> RegistrationResult<Agent> {
        let agent = self.find_agent_or_error(agent_id).await?;
        let profile = AgentProfile::new(name, description, owner)?;
        self.write_agent(agent, |current, clock| {
            current.update_profile(profile.clone(), clock);
        })
        .await
    }

    /// Publishes an immutable version, optionally making it the default.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Domain`] for invalid fields and
    /// [`RegistrationError::Store`] when the agent is missing, the tag is
    /// already published, or persistence fails.
    pub async fn publish_version(
        &self,
        request: PublishVersionRequest,
    ) -> RegistrationResult<AgentVersion> {
        let PublishVersionRequest {
            agent_id,
            version,
            serving_url,
            model_ref,
            mcp_server_url,
            schema,
            tags,
            protocols,
            security,
            make_default,
        } = request;

        let id = AgentId::new(agent_id)?;
        let tag = VersionTag::new(version)?;
        let url = EndpointUrl::new(serving_url)?;
        let mut release = AgentVersion::new(id, tag, url, &*self.clock)
            .with_tags(tags)
            .with_protocols(protocols)
            .with_security(security);
        if let Some(reference) = model_ref {
            release = release.with_model_ref(reference);
        }
        if let Some(mcp_url) = mcp_server_url {
            release = release.with_mcp_server_url(EndpointUrl::new(mcp_url)?);
        }
        if let Some(contract) = schema {
            release = release.with_schema(contract);
        }

        self.store.publish_version(&release).await?;
        info!(
            agent_id = %release.agent_id(),
            version = %release.version(),
            "published agent version"
        );

        if make_default {
            self.set_default_version(release.agent_id().as_str(), release.version().as_str())
                .await?;
        }
        Ok(release)
    }

    /// Points an agent's default at an already published version.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Store`] with
    /// [`MetadataStoreError::VersionNotFound`] when the version does not
    /// exist, or another [`RegistrationError`] for invalid input and
    /// persistence failures.
    pub async fn set_default_version(
        &self,
        agent_id: &str,
        version: &str,
    ) -> RegistrationResult<Agent> {
        let agent = self.find_agent_or_error(agent_id).await?;
        let tag = VersionTag::new(version)?;

        if self.store.find_version(agent.id(), &tag).await?.is_none() {
            return Err(MetadataStoreError::VersionNotFound {
                agent_id: agent.id().clone(),
                version: tag,
            }
            .into());
        }

        self.write_agent(agent, |current, clock| {
            current.set_default_version(tag.clone(), clock);
        })
        .await
    }

    /// Marks an agent as deprecated.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when the agent is missing or
    /// persistence fails.
    pub async fn deprecate(&self, agent_id: &str) -> RegistrationResult<Agent> {
        self.transition(agent_id, |agent, clock| agent.deprecate(clock))
            .await
    }

    /// Disables an agent so it no longer resolves.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when the agent is missing or
    /// persistence fails.
    pub async fn disable(&self, agent_id: &str) -> RegistrationResult<Agent> {
        self.transition(agent_id, |agent, clock| agent.disable(clock))
            .await
    }

    /// Returns an agent to `Active` status.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when the agent is missing or
    /// persistence fails.
    pub async fn activate(&self, agent_id: &str) -> RegistrationResult<Agent> {
        self.transition(agent_id, |agent, clock| agent.activate(clock))
            .await
    }

    /// Stores a card override after validating it against the card schema.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidCard`] listing every violation,
    /// or another [`RegistrationError`] for invalid identifiers, a missing
    /// version, and persistence failures.
    pub async fn store_card(
        &self,
        agent_id: &str,
        version: &str,
        protocol: Protocol,
        document: Value,
    ) -> RegistrationResult<StoredCard> {
        let id = AgentId::new(agent_id)?;
        let tag = VersionTag::new(version)?;
        validate_card(&document)?;

        let card = StoredCard::new(id, tag, protocol, document, &*self.clock)?;
        self.store.upsert_card(&card).await?;
        info!(
            agent_id = %card.agent_id(),
            version = %card.version(),
            protocol = %card.protocol(),
            "stored card override"
        );
        Ok(card)
    }

    /// Returns every agent ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Store`] when lookup fails.
    pub async fn list_agents(&self) -> RegistrationResult<Vec<Agent>> {
        Ok(self.store.list_agents().await?)
    }

    /// Finds an agent by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Domain`] for an invalid identifier or
    /// [`RegistrationError::Store`] when lookup fails.
    pub async fn find_agent(&self, agent_id: &str) -> RegistrationResult<Option<Agent>> {
        let id = AgentId::new(agent_id)?;
        Ok(self.store.find_agent(&id).await?)
    }

    /// Returns every version of an agent ordered by tag.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Domain`] for an invalid identifier or
    /// [`RegistrationError::Store`] when lookup fails.
    pub async fn list_versions(&self, agent_id: &str) -> RegistrationResult<Vec<AgentVersion>> {
        let id = AgentId::new(agent_id)?;
        Ok(self.store.list_versions(&id).await?)
    }

    /// Finds one version of an agent.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Domain`] for invalid input or
    /// [`RegistrationError::Store`] when lookup fails.
    pub async fn find_version(
        &self,
        agent_id: &str,
        version: &str,
    ) -> RegistrationResult<Option<AgentVersion>> {
        let id = AgentId::new(agent_id)?;
        let tag = VersionTag::new(version)?;
        Ok(self.store.find_version(&id, &tag).await?)
    }

    async fn transition<F>(&self, agent_id: &str, apply: F) -> RegistrationResult<Agent>
    where
        F: Fn(&mut Agent, &C) + Send + Sync,
    {
        let agent = self.find_agent_or_error(agent_id).await?;
        let changed = self.write_agent(agent, apply).await?;
        info!(agent_id = %changed.id(), status = %changed.status(), "changed agent status");
        Ok(changed)
    }

    /// Applies `apply` and persists the result against the revision it was
    /// read at. A concurrent write forces a fresh read and a reapply.
    async fn write_agent<F>(&self, mut agent: Agent, apply: F) -> RegistrationResult<Agent>
    where
        F: Fn(&mut Agent, &C) + Send + Sync,
    {
        for attempt in 1..MAX_WRITE_ATTEMPTS {
            let expected = agent.revision();
            apply(&mut agent, &*self.clock);
            match self.store.update_agent(&agent, expected).await {
                Ok(()) => return Ok(agent),
                Err(MetadataStoreError::ConcurrentModification { .. }) => {
                    debug!(
                        agent_id = %agent.id(),
                        attempt,
                        "agent changed underneath write, retrying"
                    );
                    agent = self.reload_agent(agent.id()).await?;
                }
                Err(err) => return Err(err.into()),
            }
        }

        let expected = agent.revision();
        apply(&mut agent, &*self.clock);
        self.store.update_agent(&agent, expected).await?;
        Ok(agent)
    }

    async fn reload_agent(&self, id: &AgentId) -> RegistrationResult<Agent> {
        self.store
            .find_agent(id)
            .await?
            .ok_or_else(|| MetadataStoreError::AgentNotFound(id.clone()).into())
    }

    async fn find_agent_or_error(&self, agent_id: &str) -> RegistrationResult<Agent> {
        let id = AgentId::new(agent_id)?;
        self.reload_agent(&id).await
    }
}
