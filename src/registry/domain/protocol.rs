//! Wire protocols a capability card can describe.

use super::ParseProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol an agent version can be reached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Model Context Protocol resource and tool access.
    Mcp,
    /// Agent-to-agent JSON-RPC messaging.
    A2a,
}

impl Protocol {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mcp => "mcp",
            Self::A2a => "a2a",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Protocol {
    type Error = ParseProtocolError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "mcp" => Ok(Self::Mcp),
            "a2a" => Ok(Self::A2a),
            _ => Err(ParseProtocolError(value.to_owned())),
        }
    }
}
