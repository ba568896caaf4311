//! Card generation and validation tests.

use std::sync::Arc;

use super::support::{registration, seed_catalogue};
use crate::discovery::{
    DiscoveryError,
    card::{CardGenerator, CardSource, card_schema, validate_card},
};
use crate::jsonrpc::ErrorKind;
use crate::registry::{
    adapters::memory::InMemoryMetadataStore,
    domain::{AgentId, Protocol, StoredCard, VersionTag},
    ports::MetadataStore,
    services::{RegistryResolver, Resolution},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn store() -> Arc<InMemoryMetadataStore> {
    Arc::new(InMemoryMetadataStore::new())
}

async fn resolve(store: &Arc<InMemoryMetadataStore>, agent: &str) -> Resolution {
    RegistryResolver::new(Arc::clone(store))
        .resolve(&AgentId::new(agent).expect("valid id"), None)
        .await
        .expect("agent should resolve")
}

// ── Schema ─────────────────────────────────────────────────────────

#[rstest]
fn card_schema_is_a_valid_schema() {
    assert!(jsonschema::validator_for(&card_schema()).is_ok());
}

#[rstest]
fn card_missing_required_fields_lists_each_violation() {
    let err = validate_card(&json!({"name": ""})).expect_err("card is incomplete");

    assert!(err.violations().len() >= 2, "got {:?}", err.violations());
    assert!(err.to_string().contains("card failed schema validation"));
}

#[rstest]
fn nested_violations_carry_their_path() {
    let err = validate_card(&json!({
        "name": "Genie",
        "url": "https://svc/genie",
        "version": "1",
        "capabilities": {},
        "skills": [{"id": "query"}]
    }))
    .expect_err("skill lacks a name");

    assert!(
        err.violations().iter().any(|message| message.starts_with("/skills/0")),
        "got {:?}",
        err.violations()
    );
}

// ── Synthesis ──────────────────────────────────────────────────────

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn synthesized_card_carries_agent_and_version_fields(store: Arc<InMemoryMetadataStore>) {
    seed_catalogue(&store).await.expect("seed");
    let resolution = resolve(&store, "genie").await;
    let generator = CardGenerator::new(Arc::clone(&store), None);

    let card = generator
        .build_card(resolution.agent(), resolution.version(), Protocol::A2a)
        .await
        .expect("card builds");

    assert_eq!(card.source(), CardSource::Synthesized);
    let body = card.body();
    assert_eq!(body["name"], json!("Genie"));
    assert_eq!(body["url"], json!("https://svc/genie"));
    assert_eq!(body["version"], json!("1"));
    assert_eq!(body["tags"], json!(["sales", "sql"]));
    assert_eq!(body["defaultInputModes"], json!(["text"]));
    assert_eq!(body["authSchemes"], json!([{"scheme": "none"}]));
    assert_eq!(body["skills"][0]["id"], json!("genie"));
    assert_eq!(body["skills"][0]["inputSchema"]["properties"]["question"]["type"], json!("string"));
}

#[rstest]
#[case::kept_relative(None, "/agents/report/v2")]
#[case::made_absolute(Some("https://gw.example/"), "https://gw.example/agents/report/v2")]
#[tokio::test(flavor = "multi_thread")]
async fn relative_urls_follow_public_base(
    store: Arc<InMemoryMetadataStore>,
    #[case] base: Option<&str>,
    #[case] expected: &str,
) {
    seed_catalogue(&store).await.expect("seed");
    let resolution = resolve(&store, "report-writer").await;
    let generator = CardGenerator::new(Arc::clone(&store), base.map(str::to_owned));

    let card = generator
        .build_card(resolution.agent(), resolution.version(), Protocol::A2a)
        .await
        .expect("card builds");

    assert_eq!(card.body()["url"], json!(expected));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn declared_skills_and_modes_are_used(store: Arc<InMemoryMetadataStore>) {
    seed_catalogue(&store).await.expect("seed");
    let resolution = resolve(&store, "report-writer").await;
    let generator = CardGenerator::new(Arc::clone(&store), None);

    let card = generator
        .build_card(resolution.agent(), resolution.version(), Protocol::A2a)
        .await
        .expect("card builds");

    let skill_ids: Vec<&Value> = card
        .body()["skills"]
        .as_array()
        .expect("skills array")
        .iter()
        .map(|skill| &skill["id"])
        .collect();
    assert_eq!(skill_ids, [&json!("summarize"), &json!("chart")]);
    assert_eq!(card.body()["defaultInputModes"], json!(["text", "data"]));
    assert_eq!(
        card.body()["authSchemes"],
        json!([{"scheme": "apikey", "header": "X-Api-Key"}])
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn card_bytes_and_digest_are_deterministic(store: Arc<InMemoryMetadataStore>) {
    seed_catalogue(&store).await.expect("seed");
    let resolution = resolve(&store, "report-writer").await;
    let generator = CardGenerator::new(Arc::clone(&store), None);

    let first = generator
        .build_card(resolution.agent(), resolution.version(), Protocol::A2a)
        .await
        .expect("first build");
    let second = generator
        .build_card(resolution.agent(), resolution.version(), Protocol::A2a)
        .await
        .expect("second build");

    assert_eq!(first.to_bytes(), second.to_bytes());
    assert_eq!(first.etag(), second.etag());
    assert_eq!(first.digest().len(), 64);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mcp_card_requires_mcp_support(store: Arc<InMemoryMetadataStore>) {
    seed_catalogue(&store).await.expect("seed");
    let resolution = resolve(&store, "genie").await;
    let generator = CardGenerator::new(Arc::clone(&store), None);

    let err = generator
        .build_card(resolution.agent(), resolution.version(), Protocol::Mcp)
        .await
        .expect_err("genie has no MCP endpoint");

    assert!(matches!(err, DiscoveryError::UnsupportedProtocol { .. }));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ── Stored overrides ───────────────────────────────────────────────

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stored_card_wins_over_synthesis(store: Arc<InMemoryMetadataStore>) {
    seed_catalogue(&store).await.expect("seed");
    let override_card = json!({
        "name": "Genie Curated",
        "url": "https://curated/genie",
        "version": "1",
        "capabilities": {"streaming": true},
        "skills": [{"id": "ask", "name": "Ask"}]
    });
    registration(&store)
        .store_card("genie", "1", Protocol::A2a, override_card.clone())
        .await
        .expect("store card");
    let resolution = resolve(&store, "genie").await;

    let card = CardGenerator::new(Arc::clone(&store), Some("https://gw".to_owned()))
        .build_card(resolution.agent(), resolution.version(), Protocol::A2a)
        .await
        .expect("card builds");

    assert_eq!(card.source(), CardSource::Stored);
    assert_eq!(card.body(), &override_card);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_stored_card_is_reported_not_repaired(store: Arc<InMemoryMetadataStore>) {
    seed_catalogue(&store).await.expect("seed");
    let corrupt = StoredCard::new(
        AgentId::new("genie").expect("valid id"),
        VersionTag::new("1").expect("valid tag"),
        Protocol::A2a,
        json!({"name": "Genie"}),
        &DefaultClock,
    )
    .expect("object document");
    store.upsert_card(&corrupt).await.expect("bypass validation");
    let resolution = resolve(&store, "genie").await;

    let err = CardGenerator::new(Arc::clone(&store), None)
        .build_card(resolution.agent(), resolution.version(), Protocol::A2a)
        .await
        .expect_err("stored card is invalid");

    assert_eq!(err.kind(), ErrorKind::Validation);
}
