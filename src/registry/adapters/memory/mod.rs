//! In-memory adapters for registry persistence.

mod store;

pub use store::InMemoryMetadataStore;
