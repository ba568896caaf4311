//! Diesel schema for registry persistence.

diesel::table! {
    /// Registered agents.
    agents (id) {
        /// Stable agent identifier.
        #[max_length = 100]
        id -> Varchar,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Free-text description.
        description -> Text,
        /// Owning team or user.
        #[max_length = 255]
        owner -> Varchar,
        /// Lifecycle status (active, deprecated, or disabled).
        #[max_length = 20]
        status -> Varchar,
        /// Default version pointer.
        #[max_length = 64]
        default_version -> Nullable<Varchar>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Write counter guarding concurrent updates.
        revision -> Int8,
    }
}

diesel::table! {
    /// Immutable agent version releases.
    agent_versions (agent_id, version) {
        /// Owning agent identifier.
        #[max_length = 100]
        agent_id -> Varchar,
        /// Release label.
        #[max_length = 64]
        version -> Varchar,
        /// Opaque model reference.
        model_ref -> Nullable<Text>,
        /// Invocation endpoint.
        serving_url -> Text,
        /// MCP server endpoint.
        mcp_server_url -> Nullable<Text>,
        /// Input/output contract as JSONB.
        io_schema -> Jsonb,
        /// Discovery tags as a JSONB array.
        tags -> Jsonb,
        /// Supported protocols as a JSONB array.
        protocols -> Jsonb,
        /// Authentication requirements as a JSONB array.
        security -> Jsonb,
        /// Publication timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Stored capability card overrides.
    agent_protocol_cards (agent_id, version, protocol) {
        /// Owning agent identifier.
        #[max_length = 100]
        agent_id -> Varchar,
        /// Owning version tag.
        #[max_length = 64]
        version -> Varchar,
        /// Described protocol.
        #[max_length = 10]
        protocol -> Varchar,
        /// Card document as JSONB.
        card -> Jsonb,
        /// Last write timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(agent_versions -> agents (agent_id));
diesel::allow_tables_to_appear_in_same_query!(agents, agent_versions, agent_protocol_cards);
