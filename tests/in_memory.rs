//! In-memory integration tests through the public crate API.
//!
//! Tests are organized into modules by functionality:
//! - `lifecycle_tests`: Registration, default switching, and status rules
//! - `invocation_flow_tests`: Registry-to-remote calls over real HTTP

mod in_memory {
    pub mod helpers;

    mod invocation_flow_tests;
    mod lifecycle_tests;
}
