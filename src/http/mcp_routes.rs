//! MCP discovery surface: `POST /api/mcp`.
//!
//! Card resources are listed and read through the resource directory. The
//! `list_available_agents` and `invoke_agent` tools give MCP clients the
//! same search and invocation paths the A2A surface offers.

use super::AppState;
use crate::discovery::{CARD_MIME_TYPE, RESOURCE_URI_PREFIX, SearchQuery};
use crate::invocation::{
    InvocationError,
    domain::{AgentCall, RequestError},
    ports::RemoteAgentClient,
};
use crate::jsonrpc::{INVALID_PARAMS, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::registry::ports::MetadataStore;
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mockable::Clock;
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::debug;

/// MCP protocol revision reported by `initialize`.
pub const MCP_PROTOCOL_VERSION: &str = "2025-03-26";

const LIST_AGENTS_TOOL: &str = "list_available_agents";
const INVOKE_AGENT_TOOL: &str = "invoke_agent";

/// Answers one MCP JSON-RPC request. Notifications get 202 with no body.
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
        debug!(method = %request.method, "accepted MCP notification");
        return StatusCode::ACCEPTED.into_response();
    }

    Json(dispatch(&state, &request).await).into_response()
}

/// Routes an MCP request to its method handler.
pub async fn dispatch<S, R, C>(
    state: &AppState<S, R, C>,
    request: &JsonRpcRequest,
) -> JsonRpcResponse
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    let id = request.response_id();
    let params = request.params.as_ref();

    let outcome = match request.method.as_str() {
        "initialize" => Ok(initialize_result()),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": tool_definitions() })),
        "tools/call" => call_tool(state, params).await,
        "resources/list" => list_resources(state).await,
        "resources/templates/list" => Ok(json!({
            "resourceTemplates": [{
                "uriTemplate": format!("{RESOURCE_URI_PREFIX}{{agent_id}}"),
                "name": "Agent card",
                "description": "A2A capability card of a registered agent at its default version.",
                "mimeType": CARD_MIME_TYPE,
            }]
        })),
        "resources/read" => read_resource(state, params).await,
        other => return JsonRpcResponse::method_not_found(id, other),
    };

    match outcome {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(error) => JsonRpcResponse::failure(id, error),
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": MCP_PROTOCOL_VERSION,
        "capabilities": {
            "resources": {"subscribe": false, "listChanged": false},
            "tools": {"listChanged": false}
        },
        "serverInfo": {
            "name": "concierge",
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

fn tool_definitions() -> Value {
    json!([
        {
            "name": LIST_AGENTS_TOOL,
            "description": "List A2A agents registered in the registry, optionally filtered by tags or skills.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "tags": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Every tag must match"
                    },
                    "skills": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Any skill may match"
                    },
                    "limit": {"type": "integer", "minimum": 1, "maximum": 100, "default": 20},
                    "include_full_card": {"type": "boolean", "default": false}
                }
            }
        },
        {
            "name": INVOKE_AGENT_TOOL,
            "description": "Invoke a registered A2A agent by ID with a structured task payload.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "agent_id": {"type": "string"},
                    "task": {"description": "Text or structured input forwarded to the agent"},
                    "version": {"type": ["string", "integer"]},
                    "timeout_seconds": {"type": "number", "exclusiveMinimum": 0}
                },
                "required": ["agent_id", "task"]
            }
        }
    ])
}

async fn list_resources<S, R, C>(state: &AppState<S, R, C>) -> Result<Value, JsonRpcError>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    let resources = state
        .directory()
        .list_resources()
        .await
        .map_err(|err| JsonRpcError::from_kind(err.kind(), err.to_string()))?;
    Ok(json!({ "resources": resources }))
}

async fn read_resource<S, R, C>(
    state: &AppState<S, R, C>,
    params: Option<&Value>,
) -> Result<Value, JsonRpcError>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    let uri = params
        .and_then(|value| value.get("uri"))
        .and_then(Value::as_str)
        .ok_or_else(|| invalid_params("resources/read requires a string 'uri'"))?;

    let card = state
        .directory()
        .read_resource(uri)
        .await
        .map_err(|err| JsonRpcError::from_kind(err.kind(), err.to_string()))?;

    Ok(json!({
        "contents": [{
            "uri": uri,
            "mimeType": CARD_MIME_TYPE,
            "text": card.to_text(),
        }]
    }))
}

async fn call_tool<S, R, C>(
    state: &AppState<S, R, C>,
    params: Option<&Value>,
) -> Result<Value, JsonRpcError>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    let name = params
        .and_then(|value| value.get("name"))
        .and_then(Value::as_str)
        .ok_or_else(|| invalid_params("tools/call requires a string 'name'"))?;
    let arguments = params
        .and_then(|value| value.get("arguments"))
        .cloned()
        .unwrap_or_else(|| json!({}));

    match name {
        LIST_AGENTS_TOOL => {
            let query: SearchQuery = serde_json::from_value(arguments).map_err(|err| {
                invalid_params(format!("invalid {LIST_AGENTS_TOOL} arguments: {err}"))
            })?;
            Ok(match state.directory().search(&query).await {
                Ok(agents) => tool_success(&json!({ "agents": agents })),
                Err(err) => tool_failure(&JsonRpcError::from_kind(err.kind(), err.to_string())),
            })
        }
        INVOKE_AGENT_TOOL => Ok(match invoke_agent(state, &arguments).await {
            Ok(result) => tool_success(&result),
            Err(err) => tool_failure(&err.to_rpc_error()),
        }),
        other => Err(invalid_params(format!("unknown tool '{other}'"))),
    }
}

async fn invoke_agent<S, R, C>(
    state: &AppState<S, R, C>,
    arguments: &Value,
) -> Result<Value, InvocationError>
where
    S: MetadataStore,
    R: RemoteAgentClient,
    C: Clock + Send + Sync,
{
    let object = arguments.as_object().ok_or(RequestError::NotAnObject)?;

    let mut fields = Map::new();
    for key in ["agent_id", "version", "metadata"] {
        if let Some(value) = object.get(key) {
            fields.insert(key.to_owned(), value.clone());
        }
    }
    if let Some(task) = object.get("task").or_else(|| object.get("input")) {
        fields.insert("input".to_owned(), task.clone());
    }

    let call = AgentCall::from_object(&fields)?;
    let timeout = parse_timeout(object.get("timeout_seconds"))?;
    let outcome = state.gateway().invoke(&call, timeout).await?;
    Ok(outcome.to_value())
}

fn parse_timeout(value: Option<&Value>) -> Result<Option<Duration>, RequestError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => raw
            .as_f64()
            .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
            .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
            .map(Some)
            .ok_or(RequestError::InvalidTimeout),
    }
}

fn tool_success(result: &Value) -> Value {
    json!({
        "content": [{"type": "text", "text": result.to_string()}],
        "structuredContent": result,
        "isError": false,
    })
}

fn tool_failure(error: &JsonRpcError) -> Value {
    let detail = error.data.clone().unwrap_or_else(|| json!({ "detail": error.message }));
    json!({
        "content": [{"type": "text", "text": detail.to_string()}],
        "structuredContent": detail,
        "isError": true,
    })
}

fn invalid_params(detail: impl Into<String>) -> JsonRpcError {
    let message = detail.into();
    JsonRpcError::new(INVALID_PARAMS, "Invalid params").with_data(json!({ "detail": message }))
}
