//! BDD steps for discovering agents as card resources.

use std::sync::Arc;

use concierge::discovery::{
    DiscoveryError, ResourceDescriptor, ResourceDirectory, card::CardDocument,
};
use concierge::registry::{
    adapters::memory::InMemoryMetadataStore,
    services::{PublishVersionRequest, RegisterAgentRequest, RegistrationService},
};
use eyre::{WrapErr, eyre};
use mockable::DefaultClock;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;

/// World state for discovery BDD tests.
struct DiscoveryWorld {
    store: Arc<InMemoryMetadataStore>,
    registration: RegistrationService<InMemoryMetadataStore, DefaultClock>,
    resources: Option<Vec<ResourceDescriptor>>,
    read_result: Option<Result<CardDocument, DiscoveryError>>,
}

#[fixture]
fn world() -> DiscoveryWorld {
    let store = Arc::new(InMemoryMetadataStore::new());
    let registration = RegistrationService::new(Arc::clone(&store), Arc::new(DefaultClock));
    DiscoveryWorld {
        store,
        registration,
        resources: None,
        read_result: None,
    }
}

fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

fn directory(world: &DiscoveryWorld) -> ResourceDirectory<InMemoryMetadataStore> {
    ResourceDirectory::new(Arc::clone(&world.store), None)
}

// ── Given ──────────────────────────────────────────────────────────

#[given(r#"agent "{agent_id}" is registered at "{serving_url}""#)]
fn agent_registered(
    world: &mut DiscoveryWorld,
    agent_id: String,
    serving_url: String,
) -> Result<(), eyre::Report> {
    run_async(world.registration.register_agent(RegisterAgentRequest::new(
        agent_id.as_str(),
        agent_id.as_str(),
        "platform",
    )))
    .wrap_err("register agent for scenario")?;
    run_async(world.registration.publish_version(
        PublishVersionRequest::new(agent_id.as_str(), "1", serving_url).as_default(),
    ))
    .wrap_err("publish default version for scenario")?;
    Ok(())
}

#[given(r#"agent "{agent_id}" is disabled"#)]
fn agent_disabled(world: &mut DiscoveryWorld, agent_id: String) -> Result<(), eyre::Report> {
    run_async(world.registration.disable(&agent_id)).wrap_err("disable agent for scenario")?;
    Ok(())
}

// ── When ───────────────────────────────────────────────────────────

#[when("the card resources are listed")]
fn resources_listed(world: &mut DiscoveryWorld) -> Result<(), eyre::Report> {
    let resources =
        run_async(directory(world).list_resources()).wrap_err("list card resources")?;
    world.resources = Some(resources);
    Ok(())
}

#[when(r#"the resource "{uri}" is read"#)]
fn resource_read(world: &mut DiscoveryWorld, uri: String) {
    world.read_result = Some(run_async(directory(world).read_resource(&uri)));
}

// ── Then ───────────────────────────────────────────────────────────

#[then(r#"the resource URIs are "{uris}""#)]
fn resource_uris_are(world: &DiscoveryWorld, uris: String) -> Result<(), eyre::Report> {
    let actual: Vec<&str> = world
        .resources
        .as_ref()
        .ok_or_else(|| eyre!("resources were not listed"))?
        .iter()
        .map(|resource| resource.uri.as_str())
        .collect();
    let expected: Vec<&str> = uris.split(',').map(str::trim).collect();
    if actual != expected {
        return Err(eyre!("expected {expected:?}, got {actual:?}"));
    }
    Ok(())
}

#[then(r#"the card names the URL "{url}""#)]
fn card_names_url(world: &DiscoveryWorld, url: String) -> Result<(), eyre::Report> {
    let card = match world.read_result.as_ref() {
        Some(Ok(card)) => card,
        Some(Err(err)) => return Err(eyre!("expected a card, read failed: {err}")),
        None => return Err(eyre!("no resource was read")),
    };
    let actual = card.body().get("url").and_then(Value::as_str);
    if actual != Some(url.as_str()) {
        return Err(eyre!("expected card url {url}, got {actual:?}"));
    }
    Ok(())
}

#[then("the read fails as not found")]
fn read_not_found(world: &DiscoveryWorld) -> Result<(), eyre::Report> {
    match world.read_result.as_ref() {
        Some(Err(err)) if err.kind() == concierge::jsonrpc::ErrorKind::NotFound => Ok(()),
        other => Err(eyre!("expected a not-found failure, got {other:?}")),
    }
}

// ── Scenarios ──────────────────────────────────────────────────────

#[scenario(
    path = "tests/features/agent_discovery.feature",
    name = "Disabled agents are not listed"
)]
#[tokio::test(flavor = "multi_thread")]
async fn disabled_agents_not_listed(world: DiscoveryWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/agent_discovery.feature",
    name = "Reading a card resource returns the agent card"
)]
#[tokio::test(flavor = "multi_thread")]
async fn read_card_resource(world: DiscoveryWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/agent_discovery.feature",
    name = "Reading an unknown card resource fails"
)]
#[tokio::test(flavor = "multi_thread")]
async fn read_unknown_card_resource(world: DiscoveryWorld) {
    let _ = world;
}
