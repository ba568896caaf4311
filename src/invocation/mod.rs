//! A2A invocation gateway for Concierge.
//!
//! The gateway accepts `message/send` requests, resolves the embedded agent
//! call against the registry, forwards a translated payload to the agent's
//! serving endpoint, and wraps the answer in an A2A task. The module follows
//! the same hexagonal layout as the registry:
//!
//! - Envelope parsing and task shapes in [`domain`]
//! - The remote agent client contract in [`ports`]
//! - The `reqwest` client in [`adapters`]
//! - Credential selection and orchestration in [`services`]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{AGENT_CALL_HINT, InvocationError};

#[cfg(test)]
mod tests;
