//! Port contracts for registry persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by the resolver and
//! registration services.

pub mod store;

pub use store::{MetadataStore, MetadataStoreError, MetadataStoreResult};
