//! Capability card documents, schema validation, and generation.

mod document;
mod generator;
mod schema;

pub use document::{CardDocument, CardSource};
pub use generator::CardGenerator;
pub use schema::{CardValidationError, card_schema, validate_card};
