//! Row conversion tests for the `PostgreSQL` metadata store.

use super::models::{AgentRow, AgentVersionRow, ProtocolCardRow};
use super::repository::{row_to_agent, row_to_card, row_to_version, to_version_row};
use crate::registry::domain::{
    AgentId, AgentStatus, AgentVersion, EndpointUrl, Protocol, SecurityRequirements,
    SecurityScheme, VersionTag,
};
use crate::registry::ports::MetadataStoreError;
use chrono::{DateTime, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(1_760_000_000, 0).unwrap_or_default()
}

#[fixture]
fn agent_row(timestamp: DateTime<Utc>) -> AgentRow {
    AgentRow {
        id: "genie".to_owned(),
        name: "Genie".to_owned(),
        description: "Answers questions about sales data".to_owned(),
        owner: "data-platform".to_owned(),
        status: "deprecated".to_owned(),
        default_version: Some("1".to_owned()),
        created_at: timestamp,
        updated_at: timestamp,
        revision: 4,
    }
}

#[rstest]
fn agent_row_reconstructs_aggregate(agent_row: AgentRow) {
    let agent = row_to_agent(agent_row).expect("row should convert");

    assert_eq!(agent.id().as_str(), "genie");
    assert_eq!(agent.name(), "Genie");
    assert_eq!(agent.status(), AgentStatus::Deprecated);
    assert_eq!(agent.default_version().map(VersionTag::as_str), Some("1"));
    assert_eq!(agent.revision(), 4);
}

#[rstest]
fn agent_row_with_negative_revision_is_invalid_persisted_data(mut agent_row: AgentRow) {
    agent_row.revision = -1;

    let result = row_to_agent(agent_row);

    assert!(matches!(
        result,
        Err(MetadataStoreError::InvalidPersistedData(_))
    ));
}

#[rstest]
#[case::bad_status("paused", "genie")]
#[case::bad_id("deprecated", "Genie Agent!")]
fn agent_row_with_corrupt_column_is_invalid_persisted_data(
    mut agent_row: AgentRow,
    #[case] status: &str,
    #[case] id: &str,
) {
    agent_row.status = status.to_owned();
    agent_row.id = id.to_owned();

    let result = row_to_agent(agent_row);

    assert!(matches!(
        result,
        Err(MetadataStoreError::InvalidPersistedData(_))
    ));
}

#[rstest]
fn version_row_survives_conversion_in_both_directions() {
    let clock = DefaultClock;
    let version = AgentVersion::new(
        AgentId::new("genie").expect("valid id"),
        VersionTag::new("2").expect("valid version"),
        EndpointUrl::new("https://svc/genie").expect("valid url"),
        &clock,
    )
    .with_tags(["sales", "sql"])
    .with_mcp_server_url(EndpointUrl::new("/mcp/genie").expect("valid url"))
    .with_security(SecurityRequirements::new([SecurityScheme::OAuth2]))
    .with_schema(json!({"skills": [{"name": "query"}]}));

    let row = to_version_row(&version).expect("version should serialize");
    assert_eq!(row.tags, json!(["sales", "sql"]));
    assert_eq!(row.protocols, json!(["mcp", "a2a"]));
    assert_eq!(row.security, json!([{"scheme": "oauth2"}]));

    let restored = row_to_version(row).expect("row should convert");
    assert_eq!(restored, version);
}

#[rstest]
fn version_row_accepts_legacy_oauth_scheme_name(timestamp: DateTime<Utc>) {
    let row = AgentVersionRow {
        agent_id: "genie".to_owned(),
        version: "1".to_owned(),
        model_ref: None,
        serving_url: "https://svc/genie".to_owned(),
        mcp_server_url: None,
        io_schema: json!({}),
        tags: json!([]),
        protocols: json!(["a2a"]),
        security: json!([{"scheme": "oauth"}, {"scheme": "apikey", "header": "X-Api-Key"}]),
        created_at: timestamp,
    };

    let version = row_to_version(row).expect("row should convert");

    assert_eq!(
        version.security().schemes(),
        &[
            SecurityScheme::OAuth2,
            SecurityScheme::ApiKey {
                header: Some("X-Api-Key".to_owned())
            }
        ]
    );
}

#[rstest]
fn card_row_must_hold_object_document(timestamp: DateTime<Utc>) {
    let row = ProtocolCardRow {
        agent_id: "genie".to_owned(),
        version: "1".to_owned(),
        protocol: "a2a".to_owned(),
        card: json!(["not", "an", "object"]),
        updated_at: timestamp,
    };

    assert!(matches!(
        row_to_card(row),
        Err(MetadataStoreError::InvalidPersistedData(_))
    ));
}

#[rstest]
fn card_row_parses_protocol(timestamp: DateTime<Utc>) {
    let row = ProtocolCardRow {
        agent_id: "genie".to_owned(),
        version: "1".to_owned(),
        protocol: "MCP".to_owned(),
        card: json!({"name": "Genie"}),
        updated_at: timestamp,
    };

    let card = row_to_card(row).expect("row should convert");
    assert_eq!(card.protocol(), Protocol::Mcp);
}
