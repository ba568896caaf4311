//! Embedded gateway requests carried inside A2A messages.

use super::RequestError;
use crate::registry::domain::{AgentId, VersionTag};
use serde_json::{Map, Value, json};

/// Action requested by an invocation envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayRequest {
    /// `{"action": "list_agents"}`.
    ListAgents,
    /// `{"agent_id": ..., "input": ..., "version": ...}`.
    CallAgent(AgentCall),
}

impl GatewayRequest {
    /// Interprets an embedded request payload.
    ///
    /// A missing `action` (or `"call_agent"`) means an agent call.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::NotAnObject`] for non-object payloads,
    /// [`RequestError::UnknownAction`] for unsupported actions, and the
    /// field errors of [`AgentCall::from_object`] for agent calls.
    pub fn from_payload(payload: &Value) -> Result<Self, RequestError> {
        let object = payload.as_object().ok_or(RequestError::NotAnObject)?;

        let action = match object.get("action") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.trim()),
            Some(other) => return Err(RequestError::UnknownAction(other.to_string())),
        };

        match action {
            Some("list_agents") => Ok(Self::ListAgents),
            None | Some("call_agent") => AgentCall::from_object(object).map(Self::CallAgent),
            Some(other) => Err(RequestError::UnknownAction(other.to_owned())),
        }
    }
}

/// Input handed to the downstream agent.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentInput {
    /// Free text, forwarded as a single user message.
    Text(String),
    /// Structured content, forwarded verbatim.
    Structured(Value),
}

impl AgentInput {
    /// Interprets an `input` value. `null` means no input.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(Self::Text(text.clone())),
            other => Some(Self::Structured(other.clone())),
        }
    }

    /// Returns `true` for blank text and empty objects or arrays.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Structured(Value::Object(map)) => map.is_empty(),
            Self::Structured(Value::Array(items)) => items.is_empty(),
            Self::Structured(_) => false,
        }
    }
}

/// A request to invoke one registered agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCall {
    agent_id: AgentId,
    version: Option<VersionTag>,
    input: Option<AgentInput>,
    metadata: Map<String, Value>,
}

impl AgentCall {
    /// Creates a call to the default version of `agent_id` with no input.
    #[must_use]
    pub fn new(agent_id: AgentId) -> Self {
        Self {
            agent_id,
            version: None,
            input: None,
            metadata: Map::new(),
        }
    }

    /// Pins the call to an explicit version.
    #[must_use]
    pub fn with_version(mut self, version: VersionTag) -> Self {
        self.version = Some(version);
        self
    }

    /// Sets the input.
    #[must_use]
    pub fn with_input(mut self, input: AgentInput) -> Self {
        self.input = Some(input);
        self
    }

    /// Sets caller metadata forwarded downstream.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Reads an agent call from a JSON object.
    ///
    /// `version` may be a tag string or a non-negative integer; `null` or a
    /// blank string selects the default version. Input presence is checked
    /// later, after the agent has been resolved.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::MissingAgentId`],
    /// [`RequestError::InvalidAgentId`], [`RequestError::InvalidVersion`],
    /// or [`RequestError::InvalidMetadata`] for the matching field.
    pub fn from_object(object: &Map<String, Value>) -> Result<Self, RequestError> {
        let agent_id = parse_agent_id(object.get("agent_id"))?;
        let version = parse_version(object.get("version"))?;
        let metadata = match object.get("metadata") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => return Err(RequestError::InvalidMetadata),
        };

        Ok(Self {
            agent_id,
            version,
            input: object.get("input").and_then(AgentInput::from_value),
            metadata,
        })
    }

    /// Returns the target agent.
    #[must_use]
    pub const fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// Returns the explicitly requested version.
    #[must_use]
    pub const fn version(&self) -> Option<&VersionTag> {
        self.version.as_ref()
    }

    /// Returns the input, if any.
    #[must_use]
    pub const fn input(&self) -> Option<&AgentInput> {
        self.input.as_ref()
    }

    /// Returns caller metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Builds the JSON body posted to the agent's serving endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::MissingInput`] when the input is absent or
    /// empty.
    pub fn downstream_payload(&self) -> Result<Value, RequestError> {
        let input = self
            .input
            .as_ref()
            .filter(|input| !input.is_empty())
            .ok_or(RequestError::MissingInput)?;

        let body = match input {
            AgentInput::Text(text) => json!([{ "role": "user", "content": text }]),
            AgentInput::Structured(value) => value.clone(),
        };

        Ok(json!({
            "input": body,
            "metadata": self.metadata,
        }))
    }
}

fn parse_agent_id(value: Option<&Value>) -> Result<AgentId, RequestError> {
    match value {
        None | Some(Value::Null) => Err(RequestError::MissingAgentId),
        Some(Value::String(raw)) if raw.trim().is_empty() => Err(RequestError::MissingAgentId),
        Some(Value::String(raw)) => {
            AgentId::new(raw.as_str()).map_err(|err| RequestError::InvalidAgentId(err.to_string()))
        }
        Some(other) => Err(RequestError::InvalidAgentId(format!(
            "expected a string, got {other}"
        ))),
    }
}

fn parse_version(value: Option<&Value>) -> Result<Option<VersionTag>, RequestError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) if raw.trim().is_empty() => Ok(None),
        Some(Value::String(raw)) => VersionTag::new(raw.as_str())
            .map(Some)
            .map_err(|err| RequestError::InvalidVersion(err.to_string())),
        Some(Value::Number(number)) => number
            .as_u64()
            .map(|release| Some(VersionTag::from_number(release)))
            .ok_or_else(|| RequestError::InvalidVersion(number.to_string())),
        Some(other) => Err(RequestError::InvalidVersion(other.to_string())),
    }
}
