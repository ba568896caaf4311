//! Shared router fixtures.

use std::sync::Arc;

use crate::http::{AppState, router};
use crate::invocation::adapters::http::ReqwestAgentClient;
use crate::registry::{
    adapters::memory::InMemoryMetadataStore,
    services::{PublishVersionRequest, RegisterAgentRequest, RegistrationError, RegistrationService},
};
use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use mockable::DefaultClock;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Seeds:
///
/// - `genie`: default `1` at `{genie_url}`, tagged `sql`
/// - `relay`: default `1` at the relative path `/agents/relay`
/// - `legacy`: disabled
pub(super) async fn seeded_store(
    genie_url: &str,
) -> Result<Arc<InMemoryMetadataStore>, RegistrationError> {
    let store = Arc::new(InMemoryMetadataStore::new());
    let service = RegistrationService::new(Arc::clone(&store), Arc::new(DefaultClock));

    for (id, name) in [("genie", "Genie"), ("relay", "Relay"), ("legacy", "Legacy")] {
        service
            .register_agent(
                RegisterAgentRequest::new(id, name, "platform")
                    .with_description(format!("{name} agent")),
            )
            .await?;
    }
    service
        .publish_version(
            PublishVersionRequest::new("genie", "1", genie_url)
                .with_tags(["sql"])
                .as_default(),
        )
        .await?;
    service
        .publish_version(PublishVersionRequest::new("relay", "1", "/agents/relay").as_default())
        .await?;
    service
        .publish_version(
            PublishVersionRequest::new("legacy", "1", "https://svc/legacy").as_default(),
        )
        .await?;
    service.disable("legacy").await?;

    Ok(store)
}

pub(super) async fn app(genie_url: &str, public_base_url: Option<&str>) -> Router {
    let store = seeded_store(genie_url).await.expect("seed registry");
    router(AppState::new(
        store,
        Arc::new(ReqwestAgentClient::default()),
        Arc::new(DefaultClock),
        public_base_url.map(str::to_owned),
    ))
}

pub(super) async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    (status, headers, body)
}

pub(super) fn json_body(body: &Bytes) -> Value {
    serde_json::from_slice(body).expect("JSON body")
}

pub(super) fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("valid request")
}

pub(super) fn post_raw(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .expect("valid request")
}

pub(super) fn rpc(uri: &str, id: Value, method: &str, params: &Value) -> Request<Body> {
    let envelope = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    });
    post_raw(uri, envelope.to_string())
}
