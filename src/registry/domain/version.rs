//! Immutable agent version releases.

use super::{AgentId, EndpointUrl, Protocol, SecurityRequirements, VersionTag};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// One published release of an agent.
///
/// Versions are assembled with the `with_*` builders before they are
/// published. Once stored they expose no mutators: changing the serving URL
/// or schema requires publishing a new version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentVersion {
    agent_id: AgentId,
    version: VersionTag,
    model_ref: Option<String>,
    serving_url: EndpointUrl,
    mcp_server_url: Option<EndpointUrl>,
    schema: Value,
    tags: BTreeSet<String>,
    protocols: BTreeSet<Protocol>,
    security: SecurityRequirements,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedVersionData {
    /// Owning agent identifier.
    pub agent_id: AgentId,
    /// Release label.
    pub version: VersionTag,
    /// Opaque model reference.
    pub model_ref: Option<String>,
    /// Endpoint accepting invocation calls.
    pub serving_url: EndpointUrl,
    /// Optional MCP server endpoint.
    pub mcp_server_url: Option<EndpointUrl>,
    /// Input/output contract document.
    pub schema: Value,
    /// Discovery tags.
    pub tags: BTreeSet<String>,
    /// Supported protocols.
    pub protocols: BTreeSet<Protocol>,
    /// Authentication requirements.
    pub security: SecurityRequirements,
    /// Publication timestamp.
    pub created_at: DateTime<Utc>,
}

impl AgentVersion {
    /// Creates an unpublished version reachable over A2A with an empty
    /// schema and no authentication.
    #[must_use]
    pub fn new(
        agent_id: AgentId,
        version: VersionTag,
        serving_url: EndpointUrl,
        clock: &impl Clock,
    ) -> Self {
        Self {
            agent_id,
            version,
            model_ref: None,
            serving_url,
            mcp_server_url: None,
            schema: Value::Object(serde_json::Map::new()),
            tags: BTreeSet::new(),
            protocols: BTreeSet::from([Protocol::A2a]),
            security: SecurityRequirements::anonymous(),
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a version from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedVersionData) -> Self {
        Self {
            agent_id: data.agent_id,
            version: data.version,
            model_ref: data.model_ref,
            serving_url: data.serving_url,
            mcp_server_url: data.mcp_server_url,
            schema: data.schema,
            tags: data.tags,
            protocols: data.protocols,
            security: data.security,
            created_at: data.created_at,
        }
    }

    /// Sets the opaque model reference.
    #[must_use]
    pub fn with_model_ref(mut self, model_ref: impl Into<String>) -> Self {
        self.model_ref = Some(model_ref.into());
        self
    }

    /// Sets the MCP server endpoint and advertises MCP support.
    #[must_use]
    pub fn with_mcp_server_url(mut self, url: EndpointUrl) -> Self {
        self.mcp_server_url = Some(url);
        self.protocols.insert(Protocol::Mcp);
        self
    }

    /// Sets the input/output contract document.
    #[must_use]
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = schema;
        self
    }

    /// Sets the discovery tags. Blank tags are dropped and the rest trimmed.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = tags
            .into_iter()
            .map(|tag| tag.as_ref().trim().to_owned())
            .filter(|tag| !tag.is_empty())
            .collect();
        self
    }

    /// Replaces the supported protocol set. An empty set keeps A2A.
    #[must_use]
    pub fn with_protocols(mut self, protocols: impl IntoIterator<Item = Protocol>) -> Self {
        let requested: BTreeSet<Protocol> = protocols.into_iter().collect();
        if !requested.is_empty() {
            self.protocols = requested;
        }
        self
    }

    /// Sets the authentication requirements.
    #[must_use]
    pub fn with_security(mut self, security: SecurityRequirements) -> Self {
        self.security = security;
        self
    }

    /// Returns the owning agent identifier.
    #[must_use]
    pub const fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// Returns the release label.
    #[must_use]
    pub const fn version(&self) -> &VersionTag {
        &self.version
    }

    /// Returns the opaque model reference.
    #[must_use]
    pub fn model_ref(&self) -> Option<&str> {
        self.model_ref.as_deref()
    }

    /// Returns the invocation endpoint.
    #[must_use]
    pub const fn serving_url(&self) -> &EndpointUrl {
        &self.serving_url
    }

    /// Returns the MCP server endpoint, if any.
    #[must_use]
    pub const fn mcp_server_url(&self) -> Option<&EndpointUrl> {
        self.mcp_server_url.as_ref()
    }

    /// Returns the contract document.
    #[must_use]
    pub const fn schema(&self) -> &Value {
        &self.schema
    }

    /// Returns the discovery tags in sorted order.
    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Returns the supported protocols.
    #[must_use]
    pub const fn protocols(&self) -> &BTreeSet<Protocol> {
        &self.protocols
    }

    /// Returns `true` when the version can be reached over `protocol`.
    #[must_use]
    pub fn supports(&self, protocol: Protocol) -> bool {
        self.protocols.contains(&protocol)
    }

    /// Returns the authentication requirements.
    #[must_use]
    pub const fn security(&self) -> &SecurityRequirements {
        &self.security
    }

    /// Returns the publication timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the skill names declared in the schema's `skills` array.
    ///
    /// Entries may be plain strings or objects carrying `name` or `id`.
    #[must_use]
    pub fn skill_names(&self) -> Vec<String> {
        self.schema
            .get("skills")
            .and_then(Value::as_array)
            .map(|skills| {
                skills
                    .iter()
                    .filter_map(|skill| match skill {
                        Value::String(name) => Some(name.clone()),
                        Value::Object(fields) => fields
                            .get("name")
                            .or_else(|| fields.get("id"))
                            .and_then(Value::as_str)
                            .map(str::to_owned),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
