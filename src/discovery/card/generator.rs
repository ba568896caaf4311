//! Builds capability cards from registry records.

use super::{CardDocument, CardSource, validate_card};
use crate::discovery::DiscoveryError;
use crate::registry::{
    domain::{Agent, AgentVersion, EndpointUrl, Protocol, SecurityScheme},
    ports::MetadataStore,
};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::debug;

const DEFAULT_MODES: [&str; 1] = ["text"];

/// Produces validated card documents, preferring stored overrides.
pub struct CardGenerator<S>
where
    S: MetadataStore,
{
    store: Arc<S>,
    public_base_url: Option<String>,
}

impl<S> Clone for CardGenerator<S>
where
    S: MetadataStore,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            public_base_url: self.public_base_url.clone(),
        }
    }
}

impl<S> CardGenerator<S>
where
    S: MetadataStore,
{
    /// Creates a generator. Relative endpoint URLs are made absolute when
    /// `public_base_url` is set and kept relative otherwise.
    #[must_use]
    pub const fn new(store: Arc<S>, public_base_url: Option<String>) -> Self {
        Self {
            store,
            public_base_url,
        }
    }

    /// Builds the card for `agent` at `version` over `protocol`.
    ///
    /// A stored card wins over synthesis. Both paths are validated against
    /// the card schema.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidCard`] when the document violates the
    /// schema, [`DiscoveryError::UnsupportedProtocol`] when no stored card
    /// exists and the version does not speak `protocol`, and
    /// [`DiscoveryError::Store`] when the card lookup fails.
    pub async fn build_card(
        &self,
        agent: &Agent,
        version: &AgentVersion,
        protocol: Protocol,
    ) -> Result<CardDocument, DiscoveryError> {
        let stored = self
            .store
            .find_card(agent.id(), version.version(), protocol)
            .await?;

        let (source, body) = match stored {
            Some(card) => (CardSource::Stored, card.document().clone()),
            None => {
                if !version.supports(protocol) {
                    return Err(DiscoveryError::UnsupportedProtocol {
                        agent_id: agent.id().clone(),
                        version: version.version().clone(),
                        protocol,
                    });
                }
                (
                    CardSource::Synthesized,
                    self.synthesize(agent, version, protocol),
                )
            }
        };

        validate_card(&body)?;
        debug!(
            agent_id = %agent.id(),
            version = %version.version(),
            protocol = %protocol,
            source = source.as_str(),
            "built agent card"
        );
        Ok(CardDocument::new(
            agent.id().clone(),
            version.version().clone(),
            protocol,
            source,
            body,
        ))
    }

    /// Returns the configured public base URL.
    #[must_use]
    pub fn public_base_url(&self) -> Option<&str> {
        self.public_base_url.as_deref()
    }

    /// Returns the externally visible form of `url`.
    #[must_use]
    pub fn public_url(&self, url: &EndpointUrl) -> String {
        url.resolve(self.public_base_url.as_deref())
            .unwrap_or_else(|| url.as_str().to_owned())
    }

    fn synthesize(&self, agent: &Agent, version: &AgentVersion, protocol: Protocol) -> Value {
        let endpoint = match (protocol, version.mcp_server_url()) {
            (Protocol::Mcp, Some(mcp_url)) => mcp_url,
            _ => version.serving_url(),
        };
        let schema = version.schema();

        let auth_schemes: Vec<Value> = if version.security().schemes().is_empty() {
            vec![json!({"scheme": "none"})]
        } else {
            version
                .security()
                .schemes()
                .iter()
                .map(auth_entry)
                .collect()
        };

        json!({
            "name": agent.name(),
            "description": agent.description(),
            "url": self.public_url(endpoint),
            "version": version.version().as_str(),
            "defaultInputModes": modes(schema, "input_modes"),
            "defaultOutputModes": modes(schema, "output_modes"),
            "capabilities": {"streaming": false},
            "skills": skills(agent, schema),
            "authSchemes": auth_schemes,
            "tags": version.tags().iter().collect::<Vec<_>>(),
            "humanReadableId": agent.id().as_str(),
            "agentVersion": version.version().as_str(),
        })
    }
}

fn auth_entry(scheme: &SecurityScheme) -> Value {
    match scheme {
        SecurityScheme::ApiKey {
            header: Some(header),
        } => json!({"scheme": scheme.card_name(), "header": header}),
        _ => json!({"scheme": scheme.card_name()}),
    }
}

fn modes(schema: &Value, key: &str) -> Vec<String> {
    let declared: Vec<String> = schema
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    if declared.is_empty() {
        DEFAULT_MODES.iter().map(|mode| (*mode).to_owned()).collect()
    } else {
        declared
    }
}

fn skills(agent: &Agent, schema: &Value) -> Vec<Value> {
    schema.get("skills").and_then(Value::as_array).map_or_else(
        || vec![default_skill(agent, schema)],
        |declared| declared.iter().filter_map(normalize_skill).collect(),
    )
}

fn normalize_skill(raw: &Value) -> Option<Value> {
    match raw {
        Value::String(name) if !name.trim().is_empty() => Some(json!({
            "id": name,
            "name": name,
            "description": "",
        })),
        Value::Object(fields) => {
            let name = fields
                .get("name")
                .or_else(|| fields.get("id"))
                .and_then(Value::as_str)
                .filter(|value| !value.trim().is_empty())?;
            let id = fields.get("id").and_then(Value::as_str).unwrap_or(name);

            let mut skill: Map<String, Value> = fields.clone();
            skill.insert("id".to_owned(), Value::String(id.to_owned()));
            skill.insert("name".to_owned(), Value::String(name.to_owned()));
            skill
                .entry("description")
                .or_insert_with(|| Value::String(String::new()));
            Some(Value::Object(skill))
        }
        _ => None,
    }
}

fn default_skill(agent: &Agent, schema: &Value) -> Value {
    let mut skill = Map::new();
    skill.insert("id".to_owned(), Value::String(agent.id().as_str().to_owned()));
    skill.insert("name".to_owned(), Value::String(agent.name().to_owned()));
    skill.insert(
        "description".to_owned(),
        Value::String(agent.description().to_owned()),
    );
    for (source_keys, target) in [
        (["input", "input_schema"], "inputSchema"),
        (["output", "output_schema"], "outputSchema"),
    ] {
        if let Some(contract) = source_keys.iter().find_map(|key| schema.get(*key)) {
            skill.insert(target.to_owned(), contract.clone());
        }
    }
    Value::Object(skill)
}
