//! Descriptive agent profile.

use super::RegistryDomainError;
use serde::{Deserialize, Serialize};

/// Human-facing description of a registered agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    name: String,
    description: String,
    owner: String,
}

impl AgentProfile {
    /// Creates a validated profile.
    ///
    /// All fields are trimmed. The description may be empty; name and owner
    /// may not.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::EmptyAgentName`] or
    /// [`RegistryDomainError::EmptyOwner`] when the corresponding field is
    /// blank.
    pub fn new(
        raw_name: impl Into<String>,
        raw_description: impl Into<String>,
        raw_owner: impl Into<String>,
    ) -> Result<Self, RegistryDomainError> {
        let name = raw_name.into().trim().to_owned();
        let description = raw_description.into().trim().to_owned();
        let owner = raw_owner.into().trim().to_owned();

        if name.is_empty() {
            return Err(RegistryDomainError::EmptyAgentName);
        }
        if owner.is_empty() {
            return Err(RegistryDomainError::EmptyOwner);
        }

        Ok(Self {
            name,
            description,
            owner,
        })
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the free-text description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the owning team or user.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }
}
