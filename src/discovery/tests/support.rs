//! Shared registry fixtures for discovery tests.

use std::sync::Arc;

use crate::registry::{
    adapters::memory::InMemoryMetadataStore,
    domain::{SecurityRequirements, SecurityScheme},
    services::{PublishVersionRequest, RegisterAgentRequest, RegistrationError, RegistrationService},
};
use mockable::DefaultClock;
use serde_json::json;

pub(super) type TestRegistration = RegistrationService<InMemoryMetadataStore, DefaultClock>;

pub(super) fn registration(store: &Arc<InMemoryMetadataStore>) -> TestRegistration {
    RegistrationService::new(Arc::clone(store), Arc::new(DefaultClock))
}

/// Seeds a catalogue covering every listing rule:
///
/// - `genie`: active, default `1`, absolute URL
/// - `report-writer`: active, default `2`, relative URL, declared skills
/// - `old-timer`: deprecated with a default
/// - `legacy`: disabled with a default
/// - `draft`: active with no default
pub(super) async fn seed_catalogue(
    store: &Arc<InMemoryMetadataStore>,
) -> Result<(), RegistrationError> {
    let service = registration(store);

    for (id, name) in [
        ("report-writer", "Report Writer"),
        ("genie", "Genie"),
        ("old-timer", "Old Timer"),
        ("legacy", "Legacy"),
        ("draft", "Draft"),
    ] {
        service
            .register_agent(
                RegisterAgentRequest::new(id, name, "platform")
                    .with_description(format!("{name} agent")),
            )
            .await?;
    }

    service
        .publish_version(
            PublishVersionRequest::new("genie", "1", "https://svc/genie")
                .with_tags(["sql", "sales"])
                .with_schema(json!({
                    "input": {"type": "object", "properties": {"question": {"type": "string"}}},
                    "output": {"type": "object"}
                }))
                .as_default(),
        )
        .await?;
    service
        .publish_version(PublishVersionRequest::new("report-writer", "1", "/agents/report"))
        .await?;
    service
        .publish_version(
            PublishVersionRequest::new("report-writer", "2", "/agents/report/v2")
                .with_tags(["reports", "sales"])
                .with_schema(json!({
                    "skills": [
                        {"id": "summarize", "name": "Summarize", "description": "Summaries"},
                        "chart"
                    ],
                    "input_modes": ["text", "data"]
                }))
                .with_security(SecurityRequirements::new([SecurityScheme::ApiKey {
                    header: Some("X-Api-Key".to_owned()),
                }]))
                .as_default(),
        )
        .await?;
    service
        .publish_version(
            PublishVersionRequest::new("old-timer", "1", "https://svc/old").as_default(),
        )
        .await?;
    service
        .publish_version(
            PublishVersionRequest::new("legacy", "1", "https://svc/legacy").as_default(),
        )
        .await?;
    service
        .publish_version(PublishVersionRequest::new("draft", "1", "https://svc/draft"))
        .await?;

    service.deprecate("old-timer").await?;
    service.disable("legacy").await?;
    Ok(())
}
