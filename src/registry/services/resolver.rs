//! Mapping of an agent identifier and optional version to a concrete release.

use crate::registry::{
    domain::{Agent, AgentId, AgentStatus, AgentVersion, VersionTag},
    ports::{MetadataStore, MetadataStoreError},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// A resolved agent together with the version callers should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    agent: Agent,
    version: AgentVersion,
}

impl Resolution {
    /// Returns the resolved agent.
    #[must_use]
    pub const fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Returns the resolved version.
    #[must_use]
    pub const fn version(&self) -> &AgentVersion {
        &self.version
    }

    /// Splits the resolution into its parts.
    #[must_use]
    pub fn into_parts(self) -> (Agent, AgentVersion) {
        (self.agent, self.version)
    }
}

/// Errors returned while resolving an agent.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// No agent is registered under the identifier.
    #[error("agent '{0}' not found")]
    AgentNotFound(AgentId),

    /// The agent exists but is disabled.
    #[error("agent '{0}' is disabled")]
    AgentDisabled(AgentId),

    /// The agent has no default version and none was requested.
    #[error("agent '{0}' has no default version")]
    NoDefaultVersion(AgentId),

    /// The requested (or default) version does not exist.
    #[error("version '{version}' not found for agent '{agent_id}'")]
    VersionNotFound {
        /// Agent identifier.
        agent_id: AgentId,
        /// Missing version tag.
        version: VersionTag,
    },

    /// The metadata store failed.
    #[error(transparent)]
    Store(#[from] MetadataStoreError),
}

impl ResolveError {
    /// Returns `true` for every variant callers should report as not found.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

/// Read-only resolver over the metadata store.
pub struct RegistryResolver<S>
where
    S: MetadataStore,
{
    store: Arc<S>,
}

impl<S> Clone for RegistryResolver<S>
where
    S: MetadataStore,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> RegistryResolver<S>
where
    S: MetadataStore,
{
    /// Creates a resolver backed by `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the backing store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Resolves `agent_id` to a concrete version.
    ///
    /// An explicit `version` is looked up exactly. Without one the agent's
    /// default version is used. Disabled agents never resolve; deprecated
    /// agents resolve with a warning.
    ///
    /// # Errors
    ///
    /// Returns a not-found [`ResolveError`] variant when the agent is
    /// missing, disabled, has no default, or lacks the version, and
    /// [`ResolveError::Store`] when the store fails.
    pub async fn resolve(
        &self,
        agent_id: &AgentId,
        version: Option<&VersionTag>,
    ) -> Result<Resolution, ResolveError> {
        let agent = self
            .store
            .find_agent(agent_id)
            .await?
            .ok_or_else(|| ResolveError::AgentNotFound(agent_id.clone()))?;

        match agent.status() {
            AgentStatus::Disabled => return Err(ResolveError::AgentDisabled(agent_id.clone())),
            AgentStatus::Deprecated => {
                warn!(agent_id = %agent_id, "resolving deprecated agent");
            }
            AgentStatus::Active => {}
        }

        let tag = match version {
            Some(requested) => requested.clone(),
            None => agent
                .default_version()
                .cloned()
                .ok_or_else(|| ResolveError::NoDefaultVersion(agent_id.clone()))?,
        };

        let resolved = self
            .store
            .find_version(agent_id, &tag)
            .await?
            .ok_or_else(|| ResolveError::VersionNotFound {
                agent_id: agent_id.clone(),
                version: tag.clone(),
            })?;

        debug!(agent_id = %agent_id, version = %tag, "resolved agent version");
        Ok(Resolution {
            agent,
            version: resolved,
        })
    }
}
