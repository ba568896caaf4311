//! Diesel row models for registry persistence.

use super::schema::{agent_protocol_cards, agent_versions, agents};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for agent records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = agents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AgentRow {
    /// Stable agent identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Owning team or user.
    pub owner: String,
    /// Lifecycle status.
    pub status: String,
    /// Default version pointer.
    pub default_version: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Write counter guarding concurrent updates.
    pub revision: i64,
}

/// Insert model for agent records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = agents)]
pub struct NewAgentRow {
    /// Stable agent identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Owning team or user.
    pub owner: String,
    /// Lifecycle status.
    pub status: String,
    /// Default version pointer.
    pub default_version: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Write counter guarding concurrent updates.
    pub revision: i64,
}

/// Query result and insert row for version records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = agent_versions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AgentVersionRow {
    /// Owning agent identifier.
    pub agent_id: String,
    /// Release label.
    pub version: String,
    /// Opaque model reference.
    pub model_ref: Option<String>,
    /// Invocation endpoint.
    pub serving_url: String,
    /// MCP server endpoint.
    pub mcp_server_url: Option<String>,
    /// Input/output contract payload.
    pub io_schema: Value,
    /// Discovery tags payload.
    pub tags: Value,
    /// Supported protocols payload.
    pub protocols: Value,
    /// Authentication requirements payload.
    pub security: Value,
    /// Publication timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query result and insert row for stored card records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = agent_protocol_cards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProtocolCardRow {
    /// Owning agent identifier.
    pub agent_id: String,
    /// Owning version tag.
    pub version: String,
    /// Described protocol.
    pub protocol: String,
    /// Card document payload.
    pub card: Value,
    /// Last write timestamp.
    pub updated_at: DateTime<Utc>,
}
