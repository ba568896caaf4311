//! A2A invocation surface: `POST /api/a2a` and the gateway's own card.

use super::AppState;
use crate::invocation::ports::RemoteAgentClient;
use crate::jsonrpc::JsonRpcRequest;
use crate::registry::ports::MetadataStore;
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mockable::Clock;
use serde_json::{Value, json};
use tracing::debug;

/// Version advertised in the gateway card.
pub const GATEWAY_CARD_VERSION: &str = "0.1.0";

/// Answers one A2A JSON-RPC request.
///
/// Envelope errors and gateway failures both come back as JSON-RPC error
/// objects with HTTP 200. Notifications are acknowledged with 202.
pub async fn handle<S, R, C>(State(state): State<AppState<S, R, C>>, body: Bytes) -> Response
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    let request = match JsonRpcRequest::parse(&body) {
        Ok(request) => request,
        Err(response) => return Json(*response).into_response(),
    };

    if request.is_notification() {
        debug!(method = %request.method, "ignoring A2A notification");
        return StatusCode::ACCEPTED.into_response();
    }

    Json(state.gateway().handle(&request).await).into_response()
}

/// Serves the gateway's own A2A card.
pub async fn gateway_card<S, R, C>(State(state): State<AppState<S, R, C>>) -> Json<Value>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    Json(gateway_card_document(&state.public_url("/api/a2a")))
}

/// Builds the card describing the gateway as an A2A agent reachable at
/// `url`.
#[must_use]
pub fn gateway_card_document(url: &str) -> Value {
    json!({
        "name": "Concierge Registry Gateway",
        "description": "Discovers registered agents and invokes them by ID through the registry.",
        "url": url,
        "version": GATEWAY_CARD_VERSION,
        "defaultInputModes": ["text"],
        "defaultOutputModes": ["text"],
        "capabilities": {"streaming": false},
        "skills": [{
            "id": "registry_gateway",
            "name": "Registry gateway",
            "description": "Send {\"action\": \"list_agents\"} or {\"agent_id\": ..., \"input\": ..., \"version\": ...} as JSON text.",
            "tags": ["registry", "gateway", "a2a"],
            "examples": [
                "{\"action\": \"list_agents\"}",
                "{\"agent_id\": \"genie\", \"input\": \"List top 3 distribution centers.\"}"
            ]
        }],
        "authSchemes": [{"scheme": "none"}]
    })
}
