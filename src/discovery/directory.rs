//! Read-only resource directory over the registry.

use super::{
    DiscoveryError,
    card::{CardDocument, CardGenerator},
};
use crate::registry::{
    domain::{AgentId, AgentStatus, Protocol, VersionTag},
    ports::MetadataStore,
    services::{RegistryResolver, Resolution},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Prefix of every agent card resource URI.
pub const RESOURCE_URI_PREFIX: &str = "resource://agent_cards/";

/// MIME type of card resources.
pub const CARD_MIME_TYPE: &str = "application/json";

/// One listable card resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDescriptor {
    /// `resource://agent_cards/{agent_id}`.
    pub uri: String,
    /// Agent display name.
    pub name: String,
    /// Agent description.
    pub description: String,
    /// Always `application/json`.
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// Catalogue entry for a discoverable agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSummary {
    /// Agent identifier.
    pub agent_id: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Lifecycle status.
    pub status: AgentStatus,
    /// Default version callers get when they omit one.
    pub default_version: String,
    /// Discovery tags of the default version.
    pub tags: Vec<String>,
    /// Skill names of the default version.
    pub skills: Vec<String>,
    /// Public invocation URL of the default version.
    pub url: String,
    /// Full card, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Value>,
}

/// Lists and reads agent card resources.
pub struct ResourceDirectory<S>
where
    S: MetadataStore,
{
    resolver: RegistryResolver<S>,
    generator: CardGenerator<S>,
}

impl<S> Clone for ResourceDirectory<S>
where
    S: MetadataStore,
{
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            generator: self.generator.clone(),
        }
    }
}

impl<S> ResourceDirectory<S>
where
    S: MetadataStore,
{
    /// Creates a directory over `store`.
    #[must_use]
    pub fn new(store: Arc<S>, public_base_url: Option<String>) -> Self {
        Self {
            resolver: RegistryResolver::new(Arc::clone(&store)),
            generator: CardGenerator::new(store, public_base_url),
        }
    }

    /// Returns the resolver the directory reads through.
    #[must_use]
    pub const fn resolver(&self) -> &RegistryResolver<S> {
        &self.resolver
    }

    /// Returns the card generator.
    #[must_use]
    pub const fn generator(&self) -> &CardGenerator<S> {
        &self.generator
    }

    /// Lists one resource per discoverable agent, ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Store`] when the store fails.
    pub async fn list_resources(&self) -> Result<Vec<ResourceDescriptor>, DiscoveryError> {
        let resolutions = self.discoverable().await?;
        Ok(resolutions
            .iter()
            .map(|resolution| {
                let agent = resolution.agent();
                ResourceDescriptor {
                    uri: resource_uri(agent.id()),
                    name: agent.name().to_owned(),
                    description: agent.description().to_owned(),
                    mime_type: CARD_MIME_TYPE.to_owned(),
                }
            })
            .collect())
    }

    /// Reads the A2A card behind a resource URI at the agent's default
    /// version.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::MalformedRequest`] when the URI does not
    /// match `resource://agent_cards/{agent_id}`, and propagates resolution,
    /// validation, and store failures.
    pub async fn read_resource(&self, uri: &str) -> Result<CardDocument, DiscoveryError> {
        let agent_id = parse_resource_uri(uri)?;
        self.read_card(&agent_id, None, Protocol::A2a).await
    }

    /// Reads the card for an agent at an explicit or default version.
    ///
    /// # Errors
    ///
    /// Propagates resolution, protocol support, validation, and store
    /// failures.
    pub async fn read_card(
        &self,
        agent_id: &AgentId,
        version: Option<&VersionTag>,
        protocol: Protocol,
    ) -> Result<CardDocument, DiscoveryError> {
        let resolution = self.resolver.resolve(agent_id, version).await?;
        self.generator
            .build_card(resolution.agent(), resolution.version(), protocol)
            .await
    }

    /// Returns summaries of every discoverable agent, ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Store`] when the store fails.
    pub async fn agent_summaries(&self) -> Result<Vec<AgentSummary>, DiscoveryError> {
        let resolutions = self.discoverable().await?;
        Ok(resolutions
            .iter()
            .map(|resolution| self.summarize(resolution))
            .collect())
    }

    pub(super) fn summarize(&self, resolution: &Resolution) -> AgentSummary {
        let agent = resolution.agent();
        let version = resolution.version();
        let declared_skills = version.skill_names();
        let skills = if declared_skills.is_empty() {
            vec![agent.id().as_str().to_owned()]
        } else {
            declared_skills
        };

        AgentSummary {
            agent_id: agent.id().as_str().to_owned(),
            name: agent.name().to_owned(),
            description: agent.description().to_owned(),
            status: agent.status(),
            default_version: version.version().as_str().to_owned(),
            tags: version.tags().iter().cloned().collect(),
            skills,
            url: self.generator.public_url(version.serving_url()),
            card: None,
        }
    }

    /// Resolves every non-disabled agent at its default version, skipping
    /// agents whose default does not resolve.
    pub(super) async fn discoverable(&self) -> Result<Vec<Resolution>, DiscoveryError> {
        let agents = self.resolver.store().list_agents().await?;
        let mut resolutions = Vec::with_capacity(agents.len());

        for agent in agents {
            if !agent.status().is_resolvable() {
                continue;
            }
            match self.resolver.resolve(agent.id(), None).await {
                Ok(resolution) => resolutions.push(resolution),
                Err(err) if err.is_not_found() => {
                    debug!(agent_id = %agent.id(), error = %err, "skipping unlisted agent");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(resolutions)
    }
}

/// Builds the resource URI for an agent.
#[must_use]
pub fn resource_uri(agent_id: &AgentId) -> String {
    format!("{RESOURCE_URI_PREFIX}{agent_id}")
}

/// Extracts the agent identifier from a card resource URI.
///
/// # Errors
///
/// Returns [`DiscoveryError::MalformedRequest`] when the URI does not match
/// the template or carries an invalid agent identifier.
pub fn parse_resource_uri(uri: &str) -> Result<AgentId, DiscoveryError> {
    let raw_id = uri.strip_prefix(RESOURCE_URI_PREFIX).ok_or_else(|| {
        DiscoveryError::MalformedRequest(format!(
            "resource uri '{uri}' does not match {RESOURCE_URI_PREFIX}{{agent_id}}"
        ))
    })?;

    if raw_id.trim() != raw_id {
        return Err(DiscoveryError::MalformedRequest(format!(
            "resource uri '{uri}' has surrounding whitespace in the agent id"
        )));
    }

    AgentId::new(raw_id).map_err(|err| DiscoveryError::MalformedRequest(err.to_string()))
}
