//! Concierge: a registry-backed protocol gateway for AI agents.
//!
//! Agents and their versions live in a registry. Concierge exposes that
//! registry two ways: MCP resources describing each agent's A2A card, for
//! discovery, and an A2A `message/send` endpoint that routes a call to the
//! resolved agent version, for invocation.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure types and validation with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage and remote calls
//! - **Adapters**: Concrete implementations of ports (`PostgreSQL`, in-memory, HTTP)
//! - **Services**: Orchestration generic over the ports
//!
//! # Modules
//!
//! - [`registry`]: Agents, versions, stored cards, and version resolution
//! - [`discovery`]: Card generation, card resources, and agent search
//! - [`invocation`]: A2A request translation and remote agent calls
//! - [`http`]: The axum router serving every surface
//! - [`jsonrpc`]: JSON-RPC 2.0 envelopes and error kinds
//! - [`config`]: Environment configuration
//! - [`telemetry`]: Log subscriber setup

pub mod config;
pub mod discovery;
pub mod http;
pub mod invocation;
pub mod jsonrpc;
pub mod registry;
pub mod telemetry;
