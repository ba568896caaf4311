//! `PostgreSQL` adapters for registry persistence.

mod models;
mod repository;
mod schema;

#[cfg(test)]
mod tests;

pub use repository::{PostgresMetadataStore, RegistryPgPool};
