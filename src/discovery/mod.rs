//! Discovery surface over the agent registry.
//!
//! Exposes registered agents as readable capability card resources, builds
//! and validates those cards, and filters the catalogue for callers looking
//! for agents by tag or skill.

pub mod card;
pub mod directory;
pub mod error;
pub mod search;

pub use directory::{
    AgentSummary, CARD_MIME_TYPE, RESOURCE_URI_PREFIX, ResourceDescriptor, ResourceDirectory,
    parse_resource_uri, resource_uri,
};
pub use error::DiscoveryError;
pub use search::SearchQuery;

#[cfg(test)]
mod tests;
