//! Agent card JSON schema and validation.

use jsonschema::Validator;
use serde_json::{Value, json};
use std::sync::LazyLock;
use thiserror::Error;

static CARD_VALIDATOR: LazyLock<Result<Validator, String>> =
    LazyLock::new(|| jsonschema::validator_for(&card_schema()).map_err(|err| err.to_string()));

/// A card document failed schema validation.
///
/// Every violation is reported; documents are never repaired.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("card failed schema validation: {}", .violations.join("; "))]
pub struct CardValidationError {
    violations: Vec<String>,
}

impl CardValidationError {
    /// Returns one message per violation.
    #[must_use]
    pub fn violations(&self) -> &[String] {
        &self.violations
    }
}

/// Returns the JSON schema every served agent card must satisfy.
#[must_use]
pub fn card_schema() -> Value {
    let string_list = json!({"type": "array", "items": {"type": "string"}});
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "AgentCard",
        "type": "object",
        "required": ["name", "url", "version", "capabilities", "skills"],
        "properties": {
            "name": {"type": "string", "minLength": 1},
            "description": {"type": "string"},
            "url": {"type": "string", "minLength": 1},
            "version": {"type": "string", "minLength": 1},
            "defaultInputModes": string_list,
            "defaultOutputModes": string_list,
            "capabilities": {
                "type": "object",
                "properties": {"streaming": {"type": "boolean"}}
            },
            "skills": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "name"],
                    "properties": {
                        "id": {"type": "string", "minLength": 1},
                        "name": {"type": "string", "minLength": 1},
                        "description": {"type": "string"},
                        "tags": string_list,
                        "examples": string_list
                    }
                }
            },
            "authSchemes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["scheme"],
                    "properties": {"scheme": {"type": "string"}}
                }
            },
            "tags": string_list,
            "humanReadableId": {"type": "string"},
            "agentVersion": {"type": "string"},
            "supportsAuthenticatedExtendedCard": {"type": "boolean"}
        }
    })
}

/// Validates a card document against [`card_schema`].
///
/// # Errors
///
/// Returns [`CardValidationError`] listing every violation, each prefixed
/// with the JSON pointer of the offending value.
pub fn validate_card(document: &Value) -> Result<(), CardValidationError> {
    let validator = CARD_VALIDATOR
        .as_ref()
        .map_err(|err| CardValidationError {
            violations: vec![format!("card schema failed to compile: {err}")],
        })?;

    let violations: Vec<String> = validator
        .iter_errors(document)
        .map(|err| {
            let path = err.instance_path.to_string();
            if path.is_empty() {
                err.to_string()
            } else {
                format!("{path}: {err}")
            }
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(CardValidationError { violations })
    }
}
