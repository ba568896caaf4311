//! Stored capability card overrides.

use super::{AgentId, Protocol, RegistryDomainError, VersionTag};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Explicit card document recorded for one (agent, version, protocol) triple.
///
/// When present it replaces the synthesized card verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCard {
    agent_id: AgentId,
    version: VersionTag,
    protocol: Protocol,
    document: Value,
    updated_at: DateTime<Utc>,
}

impl StoredCard {
    /// Creates a stored card.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::CardNotAnObject`] when `document` is not
    /// a JSON object.
    pub fn new(
        agent_id: AgentId,
        version: VersionTag,
        protocol: Protocol,
        document: Value,
        clock: &impl Clock,
    ) -> Result<Self, RegistryDomainError> {
        Self::from_persisted(agent_id, version, protocol, document, clock.utc())
    }

    /// Reconstructs a stored card from persistence.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::CardNotAnObject`] when `document` is not
    /// a JSON object.
    pub fn from_persisted(
        agent_id: AgentId,
        version: VersionTag,
        protocol: Protocol,
        document: Value,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, RegistryDomainError> {
        if !document.is_object() {
            return Err(RegistryDomainError::CardNotAnObject {
                agent_id: agent_id.into(),
                version: version.into(),
            });
        }
        Ok(Self {
            agent_id,
            version,
            protocol,
            document,
            updated_at,
        })
    }

    /// Returns the owning agent identifier.
    #[must_use]
    pub const fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// Returns the owning version tag.
    #[must_use]
    pub const fn version(&self) -> &VersionTag {
        &self.version
    }

    /// Returns the protocol this card describes.
    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Returns the stored document.
    #[must_use]
    pub const fn document(&self) -> &Value {
        &self.document
    }

    /// Returns the timestamp of the last write.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
