//! Catalogue search by tag and skill.

use super::{AgentSummary, DiscoveryError, ResourceDirectory};
use crate::registry::{domain::Protocol, ports::MetadataStore};
use serde::Deserialize;
use tracing::warn;

/// Number of results returned when the caller does not ask for a limit.
pub const DEFAULT_SEARCH_LIMIT: i64 = 20;

/// Largest number of results a single search may return.
pub const MAX_SEARCH_LIMIT: i64 = 100;

/// Filters applied to the discoverable agent catalogue.
///
/// Every requested tag must be present on an agent; at least one requested
/// skill must be. Blank filter entries are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    tags: Vec<String>,
    skills: Vec<String>,
    limit: i64,
    include_full_card: bool,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            skills: Vec::new(),
            limit: DEFAULT_SEARCH_LIMIT,
            include_full_card: false,
        }
    }
}

impl SearchQuery {
    /// Creates an unfiltered query with the default limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires every tag in `tags`.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Requires at least one skill in `skills`.
    #[must_use]
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the requested limit. It is clamped when the search runs.
    #[must_use]
    pub const fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Embeds the full card in each result.
    #[must_use]
    pub const fn with_full_card(mut self, include: bool) -> Self {
        self.include_full_card = include;
        self
    }

    /// Returns the limit clamped to `1..=100`.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        usize::try_from(self.limit.clamp(1, MAX_SEARCH_LIMIT)).unwrap_or(1)
    }

    fn matches(&self, summary: &AgentSummary) -> bool {
        let tags_match = self
            .tags
            .iter()
            .filter(|tag| !tag.is_empty())
            .all(|tag| summary.tags.contains(tag));

        let wanted_skills: Vec<&String> =
            self.skills.iter().filter(|skill| !skill.is_empty()).collect();
        let skills_match = wanted_skills.is_empty()
            || wanted_skills
                .iter()
                .any(|skill| summary.skills.contains(*skill));

        tags_match && skills_match
    }
}

impl<S> ResourceDirectory<S>
where
    S: MetadataStore,
{
    /// Returns discoverable agents matching `query`, ordered by identifier.
    ///
    /// When the query asks for full cards, agents whose card fails to build
    /// are still listed without one.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Store`] when the store fails.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<AgentSummary>, DiscoveryError> {
        let limit = query.effective_limit();
        let mut results = Vec::new();

        for resolution in self.discoverable().await? {
            let mut summary = self.summarize(&resolution);
            if !query.matches(&summary) {
                continue;
            }

            if query.include_full_card {
                match self
                    .generator()
                    .build_card(resolution.agent(), resolution.version(), Protocol::A2a)
                    .await
                {
                    Ok(card) => summary.card = Some(card.into_body()),
                    Err(err) => {
                        warn!(
                            agent_id = %summary.agent_id,
                            error = %err,
                            "omitting unbuildable card"
                        );
                    }
                }
            }

            results.push(summary);
            if results.len() >= limit {
                break;
            }
        }
        Ok(results)
    }
}
