//! Invocation services.

mod credentials;
mod gateway;

pub use credentials::GatewayCredentials;
pub use gateway::{DEFAULT_INVOKE_TIMEOUT, InvocationGateway, InvocationOutcome};
