//! Domain model for the agent registry.
//!
//! Agents are long-lived aggregate roots. Versions are immutable releases
//! owned by an agent, and stored cards are explicit capability descriptor
//! overrides for one agent version. All infrastructure concerns are kept
//! outside the domain boundary.

mod agent;
mod card;
mod endpoint;
mod error;
mod ids;
mod profile;
mod protocol;
mod security;
mod status;
mod version;

pub use agent::{Agent, PersistedAgentData};
pub use card::StoredCard;
pub use endpoint::EndpointUrl;
pub use error::{ParseAgentStatusError, ParseProtocolError, RegistryDomainError};
pub use ids::{AgentId, VersionTag};
pub use profile::AgentProfile;
pub use protocol::Protocol;
pub use security::{SecurityRequirements, SecurityScheme};
pub use status::AgentStatus;
pub use version::{AgentVersion, PersistedVersionData};
