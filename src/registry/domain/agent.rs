//! Agent aggregate root.

use super::{AgentId, AgentProfile, AgentStatus, VersionTag};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Logical agent identity and lifecycle.
///
/// The default version pointer is only ever set by the registration service
/// after it has confirmed the referenced version exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    id: AgentId,
    profile: AgentProfile,
    status: AgentStatus,
    default_version: Option<VersionTag>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    revision: u64,
}

/// Parameter object for reconstructing a persisted agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAgentData {
    /// Persisted agent identifier.
    pub id: AgentId,
    /// Persisted descriptive profile.
    pub profile: AgentProfile,
    /// Persisted lifecycle status.
    pub status: AgentStatus,
    /// Persisted default version pointer.
    pub default_version: Option<VersionTag>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted write counter.
    pub revision: u64,
}

impl Agent {
    /// Creates a new `Active` agent with no default version.
    #[must_use]
    pub fn new(id: AgentId, profile: AgentProfile, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id,
            profile,
            status: AgentStatus::Active,
            default_version: None,
            created_at: timestamp,
            updated_at: timestamp,
            revision: 0,
        }
    }

    /// Reconstructs an agent from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAgentData) -> Self {
        Self {
            id: data.id,
            profile: data.profile,
            status: data.status,
            default_version: data.default_version,
            created_at: data.created_at,
            updated_at: data.updated_at,
            revision: data.revision,
        }
    }

    /// Returns the agent identifier.
    #[must_use]
    pub const fn id(&self) -> &AgentId {
        &self.id
    }

    /// Returns the descriptive profile.
    #[must_use]
    pub const fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.profile.name()
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.profile.description()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> AgentStatus {
        self.status
    }

    /// Returns the default version pointer, if one has been set.
    #[must_use]
    pub const fn default_version(&self) -> Option<&VersionTag> {
        self.default_version.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the write counter, bumped by every mutation.
    ///
    /// Stores compare it on update to reject writes based on a stale read.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces the descriptive profile.
    pub fn update_profile(&mut self, profile: AgentProfile, clock: &impl Clock) {
        self.profile = profile;
        self.touch(clock);
    }

    /// Points the agent at a published version.
    pub fn set_default_version(&mut self, version: VersionTag, clock: &impl Clock) {
        self.default_version = Some(version);
        self.touch(clock);
    }

    /// Marks the agent as deprecated. It remains listed and invocable.
    pub fn deprecate(&mut self, clock: &impl Clock) {
        self.status = AgentStatus::Deprecated;
        self.touch(clock);
    }

    /// Disables the agent so it never resolves.
    pub fn disable(&mut self, clock: &impl Clock) {
        self.status = AgentStatus::Disabled;
        self.touch(clock);
    }

    /// Returns the agent to `Active` status.
    pub fn activate(&mut self, clock: &impl Clock) {
        self.status = AgentStatus::Active;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
        self.revision = self.revision.saturating_add(1);
    }
}
