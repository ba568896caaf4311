//! Validated identifier types for registered agents and their versions.

use super::RegistryDomainError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Maximum length for an agent identifier, matching the `VARCHAR(100)` column.
const MAX_AGENT_ID_LENGTH: usize = 100;

/// Maximum length for a version tag, matching the `VARCHAR(64)` column.
const MAX_VERSION_LENGTH: usize = 64;

/// Stable, human-readable agent identifier (e.g. `report-writer`).
///
/// Agent identifiers appear verbatim in resource URIs, so they are restricted
/// to lowercase alphanumerics, hyphens, and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentId(String);

impl AgentId {
    /// Creates a validated agent identifier.
    ///
    /// The input is trimmed and lowercased. Only characters in `[a-z0-9_-]`
    /// are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::EmptyAgentId`] when the value is empty
    /// after trimming, [`RegistryDomainError::InvalidAgentId`] when it
    /// contains characters outside `[a-z0-9_-]`, or
    /// [`RegistryDomainError::AgentIdTooLong`] when it exceeds 100 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistryDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(RegistryDomainError::EmptyAgentId);
        }

        if normalized.len() > MAX_AGENT_ID_LENGTH {
            return Err(RegistryDomainError::AgentIdTooLong(raw));
        }

        let is_valid = normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');

        if !is_valid {
            return Err(RegistryDomainError::InvalidAgentId(raw));
        }

        Ok(Self(normalized))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AgentId {
    type Error = RegistryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AgentId> for String {
    fn from(value: AgentId) -> Self {
        value.0
    }
}

/// Release label of one agent version (e.g. `3` or `2025.06-rc1`).
///
/// Tags compare numerically when both sides are plain unsigned integers so
/// that `"10"` sorts after `"9"`. Mixed or non-numeric tags fall back to
/// lexical ordering, with numeric tags sorting first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionTag(String);

impl VersionTag {
    /// Creates a validated version tag.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::EmptyVersionTag`] when the value is
    /// empty after trimming, [`RegistryDomainError::InvalidVersionTag`] when
    /// it contains whitespace, `/`, `?`, or `#`, or
    /// [`RegistryDomainError::VersionTagTooLong`] when it exceeds 64
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistryDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(RegistryDomainError::EmptyVersionTag);
        }

        if trimmed.len() > MAX_VERSION_LENGTH {
            return Err(RegistryDomainError::VersionTagTooLong(raw));
        }

        let is_valid = trimmed
            .chars()
            .all(|c| c.is_ascii_graphic() && !matches!(c, '/' | '?' | '#'));

        if !is_valid {
            return Err(RegistryDomainError::InvalidVersionTag(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Creates a version tag from an integer release number.
    #[must_use]
    pub fn from_number(number: u64) -> Self {
        Self(number.to_string())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the tag as an integer when it is a plain release number.
    #[must_use]
    pub fn as_number(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Ord for VersionTag {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_number(), other.as_number()) {
            (Some(left), Some(right)) => left.cmp(&right).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for VersionTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl AsRef<str> for VersionTag {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VersionTag {
    type Error = RegistryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VersionTag> for String {
    fn from(value: VersionTag) -> Self {
        value.0
    }
}
