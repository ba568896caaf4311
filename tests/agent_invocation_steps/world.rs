//! Shared world state for agent invocation BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use concierge::discovery::ResourceDirectory;
use concierge::invocation::{adapters::http::ReqwestAgentClient, services::InvocationGateway};
use concierge::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use concierge::registry::{adapters::memory::InMemoryMetadataStore, services::RegistrationService};
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::{Value, json};
use wiremock::MockServer;

/// Registration service used by the BDD world.
pub type TestRegistration = RegistrationService<InMemoryMetadataStore, DefaultClock>;

/// Gateway type used by the BDD world.
pub type TestGateway = InvocationGateway<InMemoryMetadataStore, ReqwestAgentClient, DefaultClock>;

/// Scenario world for agent invocation behaviour tests.
pub struct InvocationWorld {
    /// Registry backing the gateway.
    pub store: Arc<InMemoryMetadataStore>,
    /// Registration service over `store`.
    pub registration: TestRegistration,
    /// Mock remote agent, once started.
    pub remote: Option<MockServer>,
    /// Path the mock remote agent answers on.
    pub remote_path: Option<String>,
    /// Remote call timeout applied by the gateway.
    pub timeout: Duration,
    /// Response to the last `message/send` request.
    pub last_response: Option<JsonRpcResponse>,
}

impl InvocationWorld {
    /// Creates a world over an empty registry.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryMetadataStore::new());
        let registration = RegistrationService::new(Arc::clone(&store), Arc::new(DefaultClock));
        Self {
            store,
            registration,
            remote: None,
            remote_path: None,
            timeout: Duration::from_secs(5),
            last_response: None,
        }
    }

    /// Builds a gateway over the current registry state.
    pub fn gateway(&self) -> TestGateway {
        InvocationGateway::new(
            ResourceDirectory::new(Arc::clone(&self.store), None),
            Arc::new(ReqwestAgentClient::default()),
            Arc::new(DefaultClock),
        )
        .with_timeout(self.timeout)
    }

    /// Returns the serving URL of the mock remote agent.
    pub fn remote_url(&self) -> Result<String, eyre::Report> {
        let server = self
            .remote
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no remote agent started in scenario world"))?;
        let path = self.remote_path.as_deref().unwrap_or("/");
        Ok(format!("{}{path}", server.uri()))
    }

    /// Returns the artifact JSON of the last successful response.
    pub fn artifact(&self) -> Result<Value, eyre::Report> {
        let text = self
            .last_response
            .as_ref()
            .and_then(|response| response.result.as_ref())
            .and_then(|task| task.pointer("/artifacts/0/parts/0/text"))
            .and_then(Value::as_str)
            .ok_or_else(|| eyre::eyre!("last response carries no artifact text"))?;
        serde_json::from_str(text).map_err(|err| eyre::eyre!("artifact is not JSON: {err}"))
    }
}

impl Default for InvocationWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> InvocationWorld {
    InvocationWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Builds a `message/send` request embedding `payload` as JSON text.
pub fn send_message(payload: &Value) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".to_owned(),
        id: Some(json!("scenario-1")),
        method: "message/send".to_owned(),
        params: Some(json!({
            "message": {
                "role": "user",
                "messageId": "scenario-message",
                "parts": [{"kind": "text", "text": payload.to_string()}]
            }
        })),
    }
}
