//! Registration and lifecycle rules as seen by discovery and resolution.

use std::sync::Arc;

use super::helpers::{register_default, registration, store};
use concierge::discovery::{DiscoveryError, ResourceDirectory};
use concierge::registry::{
    adapters::memory::InMemoryMetadataStore,
    domain::{AgentId, Protocol, VersionTag},
    ports::MetadataStoreError,
    services::{PublishVersionRequest, RegistrationError, RegistryResolver},
};
use rstest::rstest;
use serde_json::json;

fn agent_id(raw: &str) -> AgentId {
    AgentId::new(raw).expect("valid agent id")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn switching_default_changes_resolution(store: Arc<InMemoryMetadataStore>) {
    let service = registration(&store);
    register_default(&service, "genie", "1", "https://svc/genie").await;
    service
        .publish_version(PublishVersionRequest::new("genie", "2", "https://svc/genie-v2"))
        .await
        .expect("second version");
    let resolver = RegistryResolver::new(Arc::clone(&store));

    let before = resolver
        .resolve(&agent_id("genie"), None)
        .await
        .expect("resolves");
    service
        .set_default_version("genie", "2")
        .await
        .expect("switch default");
    let after = resolver
        .resolve(&agent_id("genie"), None)
        .await
        .expect("resolves");

    assert_eq!(before.version().version().as_str(), "1");
    assert_eq!(after.version().version().as_str(), "2");
    assert_eq!(after.version().serving_url().as_str(), "https://svc/genie-v2");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn default_cannot_point_at_unpublished_version(store: Arc<InMemoryMetadataStore>) {
    let service = registration(&store);
    register_default(&service, "genie", "1", "https://svc/genie").await;

    let result = service.set_default_version("genie", "7").await;

    assert!(matches!(
        result,
        Err(RegistrationError::Store(MetadataStoreError::VersionNotFound { .. }))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn disabled_agents_leave_discovery_until_reactivated(store: Arc<InMemoryMetadataStore>) {
    let service = registration(&store);
    register_default(&service, "genie", "1", "https://svc/genie").await;
    let directory = ResourceDirectory::new(Arc::clone(&store), None);

    service.disable("genie").await.expect("disable");
    let hidden = directory.list_resources().await.expect("list");
    let read = directory.read_resource("resource://agent_cards/genie").await;

    assert!(hidden.is_empty());
    assert!(matches!(read, Err(DiscoveryError::Resolve(err)) if err.is_not_found()));

    service.activate("genie").await.expect("activate");
    let shown = directory.list_resources().await.expect("list");
    assert_eq!(shown.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deprecated_agents_stay_discoverable(store: Arc<InMemoryMetadataStore>) {
    let service = registration(&store);
    register_default(&service, "genie", "1", "https://svc/genie").await;
    service.deprecate("genie").await.expect("deprecate");
    let directory = ResourceDirectory::new(Arc::clone(&store), None);

    let card = directory
        .read_resource("resource://agent_cards/genie")
        .await
        .expect("deprecated agents still serve cards");

    assert_eq!(card.body()["url"], json!("https://svc/genie"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stored_card_overrides_synthesized_card(store: Arc<InMemoryMetadataStore>) {
    let service = registration(&store);
    register_default(&service, "genie", "1", "https://svc/genie").await;
    let override_card = json!({
        "name": "Genie (curated)",
        "url": "https://cards.example/genie",
        "version": "1",
        "capabilities": {"streaming": false},
        "skills": [{"id": "sql", "name": "SQL answers"}]
    });
    service
        .store_card("genie", "1", Protocol::A2a, override_card.clone())
        .await
        .expect("valid card stored");
    let directory = ResourceDirectory::new(Arc::clone(&store), None);

    let card = directory
        .read_card(&agent_id("genie"), Some(&VersionTag::new("1").expect("tag")), Protocol::A2a)
        .await
        .expect("card");

    assert_eq!(card.body(), &override_card);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_card_override_is_rejected(store: Arc<InMemoryMetadataStore>) {
    let service = registration(&store);
    register_default(&service, "genie", "1", "https://svc/genie").await;

    let result = service
        .store_card("genie", "1", Protocol::A2a, json!({"name": "no url"}))
        .await;

    assert!(matches!(result, Err(RegistrationError::InvalidCard(_))));
}
