//! Domain model for invocation requests and results.
//!
//! Nothing here touches the network or the registry store. Inbound A2A
//! messages are reduced to a [`GatewayRequest`], and downstream answers are
//! wrapped in a [`Task`].

mod error;
mod message;
mod request;
mod task;

pub use error::RequestError;
pub use message::{A2aMessage, MessagePart, SendMessageParams};
pub use request::{AgentCall, AgentInput, GatewayRequest};
pub use task::{Artifact, Task, TaskState, TaskStatus};
