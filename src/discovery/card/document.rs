//! Serialized capability card documents.

use crate::registry::domain::{AgentId, Protocol, VersionTag};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Where a card document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardSource {
    /// An explicit override recorded in the metadata store.
    Stored,
    /// Built from the agent and version records.
    Synthesized,
}

impl CardSource {
    /// Returns the label used in logs and response headers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::Synthesized => "synthesized",
        }
    }
}

/// A validated card for one (agent, version, protocol) triple.
///
/// The serialized form is computed once. Object keys are emitted in sorted
/// order, so identical store state yields identical bytes and digests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDocument {
    agent_id: AgentId,
    version: VersionTag,
    protocol: Protocol,
    source: CardSource,
    body: Value,
    bytes: Vec<u8>,
    digest: String,
}

impl CardDocument {
    /// Wraps an already validated card body.
    #[must_use]
    pub fn new(
        agent_id: AgentId,
        version: VersionTag,
        protocol: Protocol,
        source: CardSource,
        body: Value,
    ) -> Self {
        let bytes = body.to_string().into_bytes();
        let digest = hex::encode(Sha256::digest(&bytes));
        Self {
            agent_id,
            version,
            protocol,
            source,
            body,
            bytes,
            digest,
        }
    }

    /// Returns the agent the card describes.
    #[must_use]
    pub const fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// Returns the version the card describes.
    #[must_use]
    pub const fn version(&self) -> &VersionTag {
        &self.version
    }

    /// Returns the protocol the card describes.
    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Returns whether the card was stored or synthesized.
    #[must_use]
    pub const fn source(&self) -> CardSource {
        self.source
    }

    /// Returns the card body.
    #[must_use]
    pub const fn body(&self) -> &Value {
        &self.body
    }

    /// Returns the canonical serialized bytes.
    #[must_use]
    pub fn to_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the canonical serialized text.
    #[must_use]
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Returns the lowercase hex SHA-256 digest of [`Self::to_bytes`].
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Returns the quoted entity tag for HTTP caching.
    #[must_use]
    pub fn etag(&self) -> String {
        format!("\"{}\"", self.digest)
    }

    /// Consumes the document and returns its body.
    #[must_use]
    pub fn into_body(self) -> Value {
        self.body
    }
}
