//! Versioned agent registry for Concierge.
//!
//! The registry owns the agent, version, and protocol card records that back
//! both the discovery surface and the invocation gateway. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Resolution and registration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
