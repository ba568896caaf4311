//! Read-only registry HTTP surface under `/api/registry`.

use super::{ApiError, AppState};
use crate::discovery::card::CardDocument;
use crate::invocation::ports::RemoteAgentClient;
use crate::registry::{
    domain::{
        Agent, AgentId, AgentStatus, AgentVersion, Protocol, SecurityRequirements, VersionTag,
    },
    ports::MetadataStore,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use tracing::warn;

/// Builds the registry routes, relative to `/api/registry`.
pub fn routes<S, R, C>() -> Router<AppState<S, R, C>>
where
    S: MetadataStore + 'static,
    R: RemoteAgentClient + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/status", get(status::<S, R, C>))
        .route("/agents", get(list_agents::<S, R, C>))
        .route("/agents/{agent_id}", get(get_agent::<S, R, C>))
        .route("/agents/{agent_id}/versions", get(list_versions::<S, R, C>))
        .route(
            "/agents/{agent_id}/versions/{version}",
            get(get_version::<S, R, C>),
        )
        .route("/agents/{agent_id}/card", get(get_card::<S, R, C>))
}

/// Agent as returned by the registry surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentView {
    agent_id: String,
    name: String,
    description: String,
    owner: String,
    status: AgentStatus,
    default_version: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Agent> for AgentView {
    fn from(agent: &Agent) -> Self {
        Self {
            agent_id: agent.id().to_string(),
            name: agent.name().to_owned(),
            description: agent.description().to_owned(),
            owner: agent.profile().owner().to_owned(),
            status: agent.status(),
            default_version: agent.default_version().map(ToString::to_string),
            created_at: agent.created_at(),
            updated_at: agent.updated_at(),
        }
    }
}

/// Version as returned by the registry surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionView {
    agent_id: String,
    version: String,
    model_ref: Option<String>,
    serving_url: String,
    mcp_server_url: Option<String>,
    schema: Value,
    tags: BTreeSet<String>,
    protocols: BTreeSet<Protocol>,
    security: SecurityRequirements,
    is_default: bool,
    created_at: DateTime<Utc>,
}

impl VersionView {
    fn new(version: &AgentVersion, default: Option<&VersionTag>) -> Self {
        Self {
            agent_id: version.agent_id().to_string(),
            version: version.version().to_string(),
            model_ref: version.model_ref().map(str::to_owned),
            serving_url: version.serving_url().to_string(),
            mcp_server_url: version.mcp_server_url().map(ToString::to_string),
            schema: version.schema().clone(),
            tags: version.tags().clone(),
            protocols: version.protocols().clone(),
            security: version.security().clone(),
            is_default: default == Some(version.version()),
            created_at: version.created_at(),
        }
    }
}

/// Query string of the card endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardQuery {
    /// Explicit version; the default version when absent.
    pub version: Option<String>,
    /// `a2a` (default) or `mcp`.
    pub protocol: Option<String>,
}

async fn status<S, R, C>(State(state): State<AppState<S, R, C>>) -> Json<Value>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    let reachable = match state.directory().resolver().store().ping().await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "metadata store ping failed");
            false
        }
    };

    Json(json!({
        "status": if reachable { "ok" } else { "degraded" },
        "store": if reachable { "reachable" } else { "unreachable" },
        "mcp_url": state.public_url("/api/mcp"),
        "a2a_url": state.public_url("/api/a2a"),
        "agent_card_url": state.public_url("/api/.well-known/agent.json"),
    }))
}

async fn list_agents<S, R, C>(
    State(state): State<AppState<S, R, C>>,
) -> Result<Json<Vec<AgentView>>, ApiError>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    let agents = state.registration().list_agents().await?;
    Ok(Json(agents.iter().map(AgentView::from).collect()))
}

async fn get_agent<S, R, C>(
    State(state): State<AppState<S, R, C>>,
    Path(agent_id): Path<String>,
) -> Result<Json<AgentView>, ApiError>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    let agent = require_agent(&state, &agent_id).await?;
    Ok(Json(AgentView::from(&agent)))
}

async fn list_versions<S, R, C>(
    State(state): State<AppState<S, R, C>>,
    Path(agent_id): Path<String>,
) -> Result<Json<Vec<VersionView>>, ApiError>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    let agent = require_agent(&state, &agent_id).await?;
    let versions = state.registration().list_versions(&agent_id).await?;
    Ok(Json(
        versions
            .iter()
            .map(|version| VersionView::new(version, agent.default_version()))
            .collect(),
    ))
}

async fn get_version<S, R, C>(
    State(state): State<AppState<S, R, C>>,
    Path((agent_id, version)): Path<(String, String)>,
) -> Result<Json<VersionView>, ApiError>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    let agent = require_agent(&state, &agent_id).await?;
    let found = state
        .registration()
        .find_version(&agent_id, &version)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!("version '{version}' not found for agent '{agent_id}'"))
        })?;
    Ok(Json(VersionView::new(&found, agent.default_version())))
}

async fn get_card<S, R, C>(
    State(state): State<AppState<S, R, C>>,
    Path(agent_id): Path<String>,
    Query(query): Query<CardQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    let id = AgentId::new(agent_id.as_str()).map_err(|err| ApiError::malformed(err.to_string()))?;
    let version = query
        .version
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(VersionTag::new)
        .transpose()
        .map_err(|err| ApiError::malformed(err.to_string()))?;
    let protocol = query
        .protocol
        .as_deref()
        .map_or(Ok(Protocol::A2a), Protocol::try_from)
        .map_err(|err| ApiError::malformed(err.to_string()))?;

    let card = state
        .directory()
        .read_card(&id, version.as_ref(), protocol)
        .await?;
    Ok(card_response(&card, &headers))
}

/// Renders a card with an `ETag`, answering 304 when `If-None-Match`
/// already names it.
pub(super) fn card_response(card: &CardDocument, headers: &HeaderMap) -> Response {
    let etag = card.etag();
    let cached = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .split(',')
                .map(str::trim)
                .any(|candidate| candidate == "*" || candidate == etag)
        });

    if cached {
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
    }

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_owned()),
            (header::ETAG, etag),
        ],
        card.to_bytes().to_vec(),
    )
        .into_response()
}

async fn require_agent<S, R, C>(
    state: &AppState<S, R, C>,
    agent_id: &str,
) -> Result<Agent, ApiError>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    state
        .registration()
        .find_agent(agent_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("agent '{agent_id}' not found")))
}
