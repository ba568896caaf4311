//! HTTP surfaces of the gateway.
//!
//! One axum router serves the MCP discovery endpoint, the A2A invocation
//! endpoint, the gateway's own card, and the read-only registry API.

mod a2a_routes;
mod error;
mod mcp_routes;
mod registry_routes;
mod state;

pub use a2a_routes::{GATEWAY_CARD_VERSION, gateway_card_document};
pub use error::ApiError;
pub use mcp_routes::MCP_PROTOCOL_VERSION;
pub use state::AppState;

use crate::invocation::ports::RemoteAgentClient;
use crate::registry::ports::MetadataStore;
use axum::{
    Json, Router,
    routing::{get, post},
};
use mockable::Clock;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

/// Builds the gateway router over `state`.
pub fn router<S, R, C>(state: AppState<S, R, C>) -> Router
where
    S: MetadataStore + 'static,
    R: RemoteAgentClient + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(liveness))
        .nest("/api/registry", registry_routes::routes::<S, R, C>())
        .route("/api/mcp", post(mcp_routes::handle::<S, R, C>))
        .route("/api/a2a", post(a2a_routes::handle::<S, R, C>))
        .route(
            "/api/.well-known/agent.json",
            get(a2a_routes::gateway_card::<S, R, C>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn liveness() -> Json<Value> {
    Json(json!({
        "service": "concierge",
        "status": "ok",
    }))
}

#[cfg(test)]
mod tests;
