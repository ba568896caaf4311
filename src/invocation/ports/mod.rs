//! Port abstractions for the invocation gateway.

mod remote;

pub use remote::{RemoteAgentClient, RemoteCall, RemoteFailure, RemoteResponse, RemoteResult};
