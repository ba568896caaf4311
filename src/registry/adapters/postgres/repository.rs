//! `PostgreSQL` metadata store implementation.

use super::{
    models::{AgentRow, AgentVersionRow, NewAgentRow, ProtocolCardRow},
    schema::{agent_protocol_cards, agent_versions, agents},
};
use crate::registry::{
    domain::{
        Agent, AgentId, AgentProfile, AgentStatus, AgentVersion, EndpointUrl, PersistedAgentData,
        PersistedVersionData, Protocol, SecurityRequirements, StoredCard, VersionTag,
    },
    ports::{MetadataStore, MetadataStoreError, MetadataStoreResult},
};
use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::upsert::excluded;
use std::collections::BTreeSet;

/// `PostgreSQL` connection pool type used by registry adapters.
pub type RegistryPgPool = Pool<ConnectionManager<PgConnection>>;

const CREATE_REGISTRY_SQL: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_agent_registry/up.sql");

/// `PostgreSQL`-backed metadata store.
#[derive(Debug, Clone)]
pub struct PostgresMetadataStore {
    pool: RegistryPgPool,
}

impl PostgresMetadataStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: RegistryPgPool) -> Self {
        Self { pool }
    }

    /// Applies the registry schema. Safe to run against an already
    /// migrated database.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataStoreError::Persistence`] when a connection cannot be
    /// obtained or the DDL fails.
    pub async fn migrate(&self) -> MetadataStoreResult<()> {
        self.run_blocking(|connection| {
            connection
                .batch_execute(CREATE_REGISTRY_SQL)
                .map_err(MetadataStoreError::persistence)
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> MetadataStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> MetadataStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(MetadataStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(MetadataStoreError::persistence)?
    }
}

#[async_trait]
impl MetadataStore for PostgresMetadataStore {
    async fn register_agent(&self, agent: &Agent) -> MetadataStoreResult<()> {
        let agent_id = agent.id().clone();
        let new_row = to_new_agent_row(agent)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(agents::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        MetadataStoreError::DuplicateAgent(agent_id.clone())
                    }
                    _ => MetadataStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_agent(&self, agent: &Agent, expected_revision: u64) -> MetadataStoreResult<()> {
        let agent_id = agent.id().clone();
        let row = to_new_agent_row(agent)?;
        let expected = i64::try_from(expected_revision).map_err(MetadataStoreError::persistence)?;

        self.run_blocking(move |connection| {
            let updated_count = diesel::update(
                agents::table
                    .filter(agents::id.eq(agent_id.as_str()))
                    .filter(agents::revision.eq(expected)),
            )
            .set((
                agents::name.eq(&row.name),
                agents::description.eq(&row.description),
                agents::owner.eq(&row.owner),
                agents::status.eq(&row.status),
                agents::default_version.eq(&row.default_version),
                agents::updated_at.eq(row.updated_at),
                agents::revision.eq(row.revision),
            ))
            .execute(connection)
            .map_err(MetadataStoreError::persistence)?;

            if updated_count > 0 {
                return Ok(());
            }

            let exists = diesel::select(diesel::dsl::exists(
                agents::table.filter(agents::id.eq(agent_id.as_str())),
            ))
            .get_result::<bool>(connection)
            .map_err(MetadataStoreError::persistence)?;

            if exists {
                Err(MetadataStoreError::ConcurrentModification {
                    agent_id,
                    expected: expected_revision,
                })
            } else {
                Err(MetadataStoreError::AgentNotFound(agent_id))
            }
        })
        .await
    }

    async fn find_agent(&self, agent_id: &AgentId) -> MetadataStoreResult<Option<Agent>> {
        let id = agent_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = agents::table
                .filter(agents::id.eq(&id))
                .select(AgentRow::as_select())
                .first::<AgentRow>(connection)
                .optional()
                .map_err(MetadataStoreError::persistence)?;
            row.map(row_to_agent).transpose()
        })
        .await
    }

    async fn list_agents(&self) -> MetadataStoreResult<Vec<Agent>> {
        self.run_blocking(move |connection| {
            let rows = agents::table
                .order(agents::id.asc())
                .select(AgentRow::as_select())
                .load::<AgentRow>(connection)
                .map_err(MetadataStoreError::persistence)?;
            rows.into_iter().map(row_to_agent).collect()
        })
        .await
    }

    async fn publish_version(&self, version: &AgentVersion) -> MetadataStoreResult<()> {
        let agent_id = version.agent_id().clone();
        let tag = version.version().clone();
        let new_row = to_version_row(version)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(agent_versions::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        MetadataStoreError::DuplicateVersion {
                            agent_id: agent_id.clone(),
                            version: tag.clone(),
                        }
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        MetadataStoreError::AgentNotFound(agent_id.clone())
                    }
                    _ => MetadataStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_version(
        &self,
        agent_id: &AgentId,
        version: &VersionTag,
    ) -> MetadataStoreResult<Option<AgentVersion>> {
        let id = agent_id.as_str().to_owned();
        let tag = version.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = agent_versions::table
                .filter(agent_versions::agent_id.eq(&id))
                .filter(agent_versions::version.eq(&tag))
                .select(AgentVersionRow::as_select())
                .first::<AgentVersionRow>(connection)
                .optional()
                .map_err(MetadataStoreError::persistence)?;
            row.map(row_to_version).transpose()
        })
        .await
    }

    async fn list_versions(&self, agent_id: &AgentId) -> MetadataStoreResult<Vec<AgentVersion>> {
        let id = agent_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = agent_versions::table
                .filter(agent_versions::agent_id.eq(&id))
                .select(AgentVersionRow::as_select())
                .load::<AgentVersionRow>(connection)
                .map_err(MetadataStoreError::persistence)?;
            let mut versions = rows
                .into_iter()
                .map(row_to_version)
                .collect::<MetadataStoreResult<Vec<_>>>()?;
            versions.sort_by(|left, right| left.version().cmp(right.version()));
            Ok(versions)
        })
        .await
    }

    async fn upsert_card(&self, card: &StoredCard) -> MetadataStoreResult<()> {
        let agent_id = card.agent_id().clone();
        let tag = card.version().clone();
        let row = ProtocolCardRow {
            agent_id: card.agent_id().as_str().to_owned(),
            version: card.version().as_str().to_owned(),
            protocol: card.protocol().as_str().to_owned(),
            card: card.document().clone(),
            updated_at: card.updated_at(),
        };

        self.run_blocking(move |connection| {
            diesel::insert_into(agent_protocol_cards::table)
                .values(&row)
                .on_conflict((
                    agent_protocol_cards::agent_id,
                    agent_protocol_cards::version,
                    agent_protocol_cards::protocol,
                ))
                .do_update()
                .set((
                    agent_protocol_cards::card.eq(excluded(agent_protocol_cards::card)),
                    agent_protocol_cards::updated_at
                        .eq(excluded(agent_protocol_cards::updated_at)),
                ))
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        MetadataStoreError::VersionNotFound {
                            agent_id: agent_id.clone(),
                            version: tag.clone(),
                        }
                    }
                    _ => MetadataStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_card(
        &self,
        agent_id: &AgentId,
        version: &VersionTag,
        protocol: Protocol,
    ) -> MetadataStoreResult<Option<StoredCard>> {
        let id = agent_id.as_str().to_owned();
        let tag = version.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = agent_protocol_cards::table
                .filter(agent_protocol_cards::agent_id.eq(&id))
                .filter(agent_protocol_cards::version.eq(&tag))
                .filter(agent_protocol_cards::protocol.eq(protocol.as_str()))
                .select(ProtocolCardRow::as_select())
                .first::<ProtocolCardRow>(connection)
                .optional()
                .map_err(MetadataStoreError::persistence)?;
            row.map(row_to_card).transpose()
        })
        .await
    }

    async fn ping(&self) -> MetadataStoreResult<()> {
        self.run_blocking(|connection| {
            diesel::sql_query("SELECT 1")
                .execute(connection)
                .map_err(MetadataStoreError::persistence)?;
            Ok(())
        })
        .await
    }
}

fn to_new_agent_row(agent: &Agent) -> MetadataStoreResult<NewAgentRow> {
    let revision = i64::try_from(agent.revision()).map_err(MetadataStoreError::persistence)?;
    Ok(NewAgentRow {
        id: agent.id().as_str().to_owned(),
        name: agent.profile().name().to_owned(),
        description: agent.profile().description().to_owned(),
        owner: agent.profile().owner().to_owned(),
        status: agent.status().as_str().to_owned(),
        default_version: agent.default_version().map(|tag| tag.as_str().to_owned()),
        created_at: agent.created_at(),
        updated_at: agent.updated_at(),
        revision,
    })
}

pub(super) fn to_version_row(version: &AgentVersion) -> MetadataStoreResult<AgentVersionRow> {
    let tags = serde_json::to_value(version.tags()).map_err(MetadataStoreError::persistence)?;
    let protocols =
        serde_json::to_value(version.protocols()).map_err(MetadataStoreError::persistence)?;
    let security =
        serde_json::to_value(version.security()).map_err(MetadataStoreError::persistence)?;

    Ok(AgentVersionRow {
        agent_id: version.agent_id().as_str().to_owned(),
        version: version.version().as_str().to_owned(),
        model_ref: version.model_ref().map(str::to_owned),
        serving_url: version.serving_url().as_str().to_owned(),
        mcp_server_url: version.mcp_server_url().map(|url| url.as_str().to_owned()),
        io_schema: version.schema().clone(),
        tags,
        protocols,
        security,
        created_at: version.created_at(),
    })
}

pub(super) fn row_to_agent(row: AgentRow) -> MetadataStoreResult<Agent> {
    let AgentRow {
        id,
        name,
        description,
        owner,
        status,
        default_version,
        created_at,
        updated_at,
        revision,
    } = row;

    let parsed_id = AgentId::new(id).map_err(MetadataStoreError::invalid_persisted_data)?;
    let profile = AgentProfile::new(name, description, owner)
        .map_err(MetadataStoreError::invalid_persisted_data)?;
    let parsed_status = AgentStatus::try_from(status.as_str())
        .map_err(MetadataStoreError::invalid_persisted_data)?;
    let parsed_default = default_version
        .map(VersionTag::new)
        .transpose()
        .map_err(MetadataStoreError::invalid_persisted_data)?;
    let parsed_revision =
        u64::try_from(revision).map_err(MetadataStoreError::invalid_persisted_data)?;

    Ok(Agent::from_persisted(PersistedAgentData {
        id: parsed_id,
        profile,
        status: parsed_status,
        default_version: parsed_default,
        created_at,
        updated_at,
        revision: parsed_revision,
    }))
}

pub(super) fn row_to_version(row: AgentVersionRow) -> MetadataStoreResult<AgentVersion> {
    let AgentVersionRow {
        agent_id,
        version,
        model_ref,
        serving_url,
        mcp_server_url,
        io_schema,
        tags,
        protocols,
        security,
        created_at,
    } = row;

    let parsed_agent_id =
        AgentId::new(agent_id).map_err(MetadataStoreError::invalid_persisted_data)?;
    let parsed_version =
        VersionTag::new(version).map_err(MetadataStoreError::invalid_persisted_data)?;
    let parsed_serving_url =
        EndpointUrl::new(serving_url).map_err(MetadataStoreError::invalid_persisted_data)?;
    let parsed_mcp_url = mcp_server_url
        .map(EndpointUrl::new)
        .transpose()
        .map_err(MetadataStoreError::invalid_persisted_data)?;
    let parsed_tags: BTreeSet<String> =
        serde_json::from_value(tags).map_err(MetadataStoreError::invalid_persisted_data)?;
    let parsed_protocols: BTreeSet<Protocol> =
        serde_json::from_value(protocols).map_err(MetadataStoreError::invalid_persisted_data)?;
    let parsed_security: SecurityRequirements =
        serde_json::from_value(security).map_err(MetadataStoreError::invalid_persisted_data)?;

    Ok(AgentVersion::from_persisted(PersistedVersionData {
        agent_id: parsed_agent_id,
        version: parsed_version,
        model_ref,
        serving_url: parsed_serving_url,
        mcp_server_url: parsed_mcp_url,
        schema: io_schema,
        tags: parsed_tags,
        protocols: parsed_protocols,
        security: parsed_security,
        created_at,
    }))
}

pub(super) fn row_to_card(row: ProtocolCardRow) -> MetadataStoreResult<StoredCard> {
    let ProtocolCardRow {
        agent_id,
        version,
        protocol,
        card,
        updated_at,
    } = row;

    let parsed_agent_id =
        AgentId::new(agent_id).map_err(MetadataStoreError::invalid_persisted_data)?;
    let parsed_version =
        VersionTag::new(version).map_err(MetadataStoreError::invalid_persisted_data)?;
    let parsed_protocol =
        Protocol::try_from(protocol.as_str()).map_err(MetadataStoreError::invalid_persisted_data)?;

    StoredCard::from_persisted(
        parsed_agent_id,
        parsed_version,
        parsed_protocol,
        card,
        updated_at,
    )
    .map_err(MetadataStoreError::invalid_persisted_data)
}
