//! In-memory metadata store for tests and local development.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::registry::{
    domain::{Agent, AgentId, AgentVersion, Protocol, StoredCard, VersionTag},
    ports::{MetadataStore, MetadataStoreError, MetadataStoreResult},
};

/// Thread-safe in-memory metadata store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetadataStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

type CardKey = (AgentId, VersionTag, Protocol);

#[derive(Debug, Default)]
struct InMemoryStoreState {
    agents: BTreeMap<AgentId, Agent>,
    versions: HashMap<AgentId, BTreeMap<VersionTag, AgentVersion>>,
    cards: HashMap<CardKey, StoredCard>,
}

impl InMemoryMetadataStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl std::fmt::Display) -> MetadataStoreError {
    MetadataStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn register_agent(&self, agent: &Agent) -> MetadataStoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;

        if state.agents.contains_key(agent.id()) {
            return Err(MetadataStoreError::DuplicateAgent(agent.id().clone()));
        }

        state.agents.insert(agent.id().clone(), agent.clone());
        Ok(())
    }

    async fn update_agent(&self, agent: &Agent, expected_revision: u64) -> MetadataStoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;

        let stored = state
            .agents
            .get_mut(agent.id())
            .ok_or_else(|| MetadataStoreError::AgentNotFound(agent.id().clone()))?;
        if stored.revision() != expected_revision {
            return Err(MetadataStoreError::ConcurrentModification {
                agent_id: agent.id().clone(),
                expected: expected_revision,
            });
        }
        *stored = agent.clone();
        Ok(())
    }

    async fn find_agent(&self, agent_id: &AgentId) -> MetadataStoreResult<Option<Agent>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.agents.get(agent_id).cloned())
    }

    async fn list_agents(&self) -> MetadataStoreResult<Vec<Agent>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.agents.values().cloned().collect())
    }

    async fn publish_version(&self, version: &AgentVersion) -> MetadataStoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;

        if !state.agents.contains_key(version.agent_id()) {
            return Err(MetadataStoreError::AgentNotFound(
                version.agent_id().clone(),
            ));
        }

        let releases = state.versions.entry(version.agent_id().clone()).or_default();
        if releases.contains_key(version.version()) {
            return Err(MetadataStoreError::DuplicateVersion {
                agent_id: version.agent_id().clone(),
                version: version.version().clone(),
            });
        }

        releases.insert(version.version().clone(), version.clone());
        Ok(())
    }

    async fn find_version(
        &self,
        agent_id: &AgentId,
        version: &VersionTag,
    ) -> MetadataStoreResult<Option<AgentVersion>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .versions
            .get(agent_id)
            .and_then(|releases| releases.get(version))
            .cloned())
    }

    async fn list_versions(&self, agent_id: &AgentId) -> MetadataStoreResult<Vec<AgentVersion>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .versions
            .get(agent_id)
            .map(|releases| releases.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert_card(&self, card: &StoredCard) -> MetadataStoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;

        let version_exists = state
            .versions
            .get(card.agent_id())
            .is_some_and(|releases| releases.contains_key(card.version()));
        if !version_exists {
            return Err(MetadataStoreError::VersionNotFound {
                agent_id: card.agent_id().clone(),
                version: card.version().clone(),
            });
        }

        let key = (
            card.agent_id().clone(),
            card.version().clone(),
            card.protocol(),
        );
        state.cards.insert(key, card.clone());
        Ok(())
    }

    async fn find_card(
        &self,
        agent_id: &AgentId,
        version: &VersionTag,
        protocol: Protocol,
    ) -> MetadataStoreResult<Option<StoredCard>> {
        let state = self.state.read().map_err(poisoned)?;
        let key = (agent_id.clone(), version.clone(), protocol);
        Ok(state.cards.get(&key).cloned())
    }

    async fn ping(&self) -> MetadataStoreResult<()> {
        let _state = self.state.read().map_err(poisoned)?;
        Ok(())
    }
}
