//! Registry-to-remote invocation over real HTTP against a mock agent.

use std::sync::Arc;
use std::time::Duration;

use super::helpers::{gateway, register_default, registration, store};
use concierge::invocation::{
    InvocationError,
    domain::{AgentCall, AgentInput},
    ports::RemoteFailure,
};
use concierge::jsonrpc::ErrorKind;
use concierge::registry::{
    adapters::memory::InMemoryMetadataStore, domain::{AgentId, VersionTag},
    services::PublishVersionRequest,
};
use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn genie_call(input: &str) -> AgentCall {
    AgentCall::new(AgentId::new("genie").expect("valid agent id"))
        .with_input(AgentInput::Text(input.to_owned()))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn explicit_version_reaches_its_own_serving_url(store: Arc<InMemoryMetadataStore>) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2"))
        .and(body_json(json!({
            "input": [{"role": "user", "content": "hello"}],
            "metadata": {}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": 42})))
        .expect(1)
        .mount(&server)
        .await;
    let service = registration(&store);
    register_default(&service, "genie", "1", &format!("{}/v1", server.uri())).await;
    service
        .publish_version(PublishVersionRequest::new(
            "genie",
            "2",
            format!("{}/v2", server.uri()),
        ))
        .await
        .expect("second version");

    let outcome = gateway(&store, Duration::from_secs(5))
        .invoke(
            &genie_call("hello").with_version(VersionTag::new("2").expect("tag")),
            None,
        )
        .await
        .expect("call succeeds");

    assert_eq!(outcome.version.as_str(), "2");
    assert_eq!(outcome.status_code, 200);
    assert_eq!(outcome.payload, json!({"answer": 42}));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn slow_agent_times_out(store: Arc<InMemoryMetadataStore>) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    let service = registration(&store);
    register_default(&service, "genie", "1", &server.uri()).await;

    let result = gateway(&store, Duration::from_millis(100))
        .invoke(&genie_call("hello"), None)
        .await;

    let err = result.expect_err("call must time out");
    assert!(matches!(err, InvocationError::Remote(RemoteFailure::Timeout { .. })));
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_credentials_are_unauthorized(store: Arc<InMemoryMetadataStore>) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let service = registration(&store);
    register_default(&service, "genie", "1", &server.uri()).await;

    let err = gateway(&store, Duration::from_secs(5))
        .invoke(&genie_call("hello"), None)
        .await
        .expect_err("call must fail");

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn event_stream_answers_are_collected(store: Arc<InMemoryMetadataStore>) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string("data: {\"step\": 1}\n\ndata: {\"step\": 2}\n\n"),
        )
        .mount(&server)
        .await;
    let service = registration(&store);
    register_default(&service, "genie", "1", &server.uri()).await;

    let outcome = gateway(&store, Duration::from_secs(5))
        .invoke(&genie_call("hello"), None)
        .await
        .expect("call succeeds");

    assert_eq!(outcome.payload, json!({"events": [{"step": 1}, {"step": 2}]}));
}
