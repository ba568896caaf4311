//! Shared fixtures for in-memory integration tests.

use std::sync::Arc;
use std::time::Duration;

use concierge::discovery::ResourceDirectory;
use concierge::invocation::{adapters::http::ReqwestAgentClient, services::InvocationGateway};
use concierge::registry::{
    adapters::memory::InMemoryMetadataStore,
    services::{PublishVersionRequest, RegisterAgentRequest, RegistrationService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Registration service over the in-memory store.
pub type TestRegistration = RegistrationService<InMemoryMetadataStore, DefaultClock>;

/// Gateway wired to a real HTTP client.
pub type TestGateway = InvocationGateway<InMemoryMetadataStore, ReqwestAgentClient, DefaultClock>;

/// A fresh store shared by the services under test.
#[fixture]
pub fn store() -> Arc<InMemoryMetadataStore> {
    Arc::new(InMemoryMetadataStore::new())
}

/// Creates a registration service over `store`.
pub fn registration(store: &Arc<InMemoryMetadataStore>) -> TestRegistration {
    RegistrationService::new(Arc::clone(store), Arc::new(DefaultClock))
}

/// Creates a gateway over `store` with the given remote call timeout.
pub fn gateway(store: &Arc<InMemoryMetadataStore>, timeout: Duration) -> TestGateway {
    InvocationGateway::new(
        ResourceDirectory::new(Arc::clone(store), None),
        Arc::new(ReqwestAgentClient::default()),
        Arc::new(DefaultClock),
    )
    .with_timeout(timeout)
}

/// Registers `agent_id` and publishes `version` at `serving_url` as its
/// default.
pub async fn register_default(
    service: &TestRegistration,
    agent_id: &str,
    version: &str,
    serving_url: &str,
) {
    service
        .register_agent(RegisterAgentRequest::new(agent_id, agent_id, "platform"))
        .await
        .expect("agent registration should succeed");
    service
        .publish_version(PublishVersionRequest::new(agent_id, version, serving_url).as_default())
        .await
        .expect("version publication should succeed");
}
