//! Metadata store port for agent, version, and card records.

use crate::registry::domain::{Agent, AgentId, AgentVersion, Protocol, StoredCard, VersionTag};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for metadata store operations.
pub type MetadataStoreResult<T> = Result<T, MetadataStoreError>;

/// Registry persistence contract.
///
/// The store is the single source of truth; callers never cache records
/// across requests.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Stores a new agent.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataStoreError::DuplicateAgent`] when the identifier is
    /// already registered.
    async fn register_agent(&self, agent: &Agent) -> MetadataStoreResult<()>;

    /// Persists changes to an existing agent (profile, status, default
    /// version, timestamps).
    ///
    /// The write only applies while the stored revision still equals
    /// `expected_revision`, the revision the caller read before mutating.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataStoreError::AgentNotFound`] when the agent does not
    /// exist or [`MetadataStoreError::ConcurrentModification`] when another
    /// write landed after `expected_revision` was read.
    async fn update_agent(&self, agent: &Agent, expected_revision: u64) -> MetadataStoreResult<()>;

    /// Finds an agent by identifier.
    async fn find_agent(&self, agent_id: &AgentId) -> MetadataStoreResult<Option<Agent>>;

    /// Returns every agent ordered by identifier ascending.
    async fn list_agents(&self) -> MetadataStoreResult<Vec<Agent>>;

    /// Stores a new version.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataStoreError::AgentNotFound`] when the owning agent
    /// does not exist or [`MetadataStoreError::DuplicateVersion`] when the
    /// tag is already published for that agent.
    async fn publish_version(&self, version: &AgentVersion) -> MetadataStoreResult<()>;

    /// Finds one version of an agent.
    async fn find_version(
        &self,
        agent_id: &AgentId,
        version: &VersionTag,
    ) -> MetadataStoreResult<Option<AgentVersion>>;

    /// Returns every version of an agent ordered by tag ascending.
    async fn list_versions(&self, agent_id: &AgentId) -> MetadataStoreResult<Vec<AgentVersion>>;

    /// Finds the version an agent's default pointer references.
    ///
    /// Returns `None` when the agent does not exist or has no default.
    async fn find_default_version(
        &self,
        agent_id: &AgentId,
    ) -> MetadataStoreResult<Option<AgentVersion>> {
        let Some(agent) = self.find_agent(agent_id).await? else {
            return Ok(None);
        };
        let Some(tag) = agent.default_version() else {
            return Ok(None);
        };
        self.find_version(agent_id, tag).await
    }

    /// Inserts or replaces the stored card for its (agent, version, protocol)
    /// triple.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataStoreError::VersionNotFound`] when the owning
    /// version does not exist.
    async fn upsert_card(&self, card: &StoredCard) -> MetadataStoreResult<()>;

    /// Finds the stored card for an (agent, version, protocol) triple.
    async fn find_card(
        &self,
        agent_id: &AgentId,
        version: &VersionTag,
        protocol: Protocol,
    ) -> MetadataStoreResult<Option<StoredCard>>;

    /// Checks that the backing store is reachable.
    async fn ping(&self) -> MetadataStoreResult<()>;
}

/// Errors returned by metadata store implementations.
#[derive(Debug, Clone, Error)]
pub enum MetadataStoreError {
    /// An agent with the same identifier already exists.
    #[error("duplicate agent identifier: {0}")]
    DuplicateAgent(AgentId),

    /// The version tag is already published for the agent.
    #[error("duplicate version {version} for agent {agent_id}")]
    DuplicateVersion {
        /// Owning agent identifier.
        agent_id: AgentId,
        /// Conflicting version tag.
        version: VersionTag,
    },

    /// The agent was not found.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// The version was not found.
    #[error("version {version} not found for agent {agent_id}")]
    VersionNotFound {
        /// Owning agent identifier.
        agent_id: AgentId,
        /// Missing version tag.
        version: VersionTag,
    },

    /// The agent changed between the caller's read and its write.
    #[error("agent {agent_id} was modified concurrently (expected revision {expected})")]
    ConcurrentModification {
        /// Agent whose write was rejected.
        agent_id: AgentId,
        /// Revision the rejected write was based on.
        expected: u64,
    },

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl MetadataStoreError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
